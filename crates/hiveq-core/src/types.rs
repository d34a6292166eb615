//! Core types for hiveq-core.
//!
//! The hive data model ([`Key`], [`Value`], [`ValueType`]) is built by a hive
//! loader and consumed read-only by the query pipeline. A [`Hit`] is a borrowed
//! view into that model; searches hand out hits, never copies.

use chrono::{DateTime, Utc};
use std::fmt::{self, Write as _};

use crate::results::display_path;

/// Default last-write layout.
///
/// `%.7f` is expanded by [`write_timestamp`] itself: a dot and seven digits
/// of 100-nanosecond ticks, the resolution of a registry FILETIME. Every other
/// specifier goes to chrono.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.7f";

const TICKS_SPECIFIER: &str = "%.7f";

/// Registry value data type, as declared in the value record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    Sz,
    ExpandSz,
    Binary,
    Dword,
    DwordBigEndian,
    Link,
    MultiSz,
    ResourceList,
    FullResourceDescriptor,
    ResourceRequirementsList,
    Qword,
    Unknown(u32),
}

impl ValueType {
    /// Map the raw on-disk type code to a [`ValueType`].
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ValueType::None,
            1 => ValueType::Sz,
            2 => ValueType::ExpandSz,
            3 => ValueType::Binary,
            4 => ValueType::Dword,
            5 => ValueType::DwordBigEndian,
            6 => ValueType::Link,
            7 => ValueType::MultiSz,
            8 => ValueType::ResourceList,
            9 => ValueType::FullResourceDescriptor,
            10 => ValueType::ResourceRequirementsList,
            11 => ValueType::Qword,
            other => ValueType::Unknown(other),
        }
    }

    /// Parse the display name produced by [`ValueType`]'s `Display` impl.
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.to_ascii_lowercase().as_str() {
            "regnone" => ValueType::None,
            "regsz" => ValueType::Sz,
            "regexpandsz" => ValueType::ExpandSz,
            "regbinary" => ValueType::Binary,
            "regdword" => ValueType::Dword,
            "regdwordbigendian" => ValueType::DwordBigEndian,
            "reglink" => ValueType::Link,
            "regmultisz" => ValueType::MultiSz,
            "regresourcelist" => ValueType::ResourceList,
            "regfullresourcedescriptor" => ValueType::FullResourceDescriptor,
            "regresourcerequirementslist" => ValueType::ResourceRequirementsList,
            "regqword" => ValueType::Qword,
            _ => return None,
        };
        Some(ty)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::None => write!(f, "RegNone"),
            ValueType::Sz => write!(f, "RegSz"),
            ValueType::ExpandSz => write!(f, "RegExpandSz"),
            ValueType::Binary => write!(f, "RegBinary"),
            ValueType::Dword => write!(f, "RegDword"),
            ValueType::DwordBigEndian => write!(f, "RegDwordBigEndian"),
            ValueType::Link => write!(f, "RegLink"),
            ValueType::MultiSz => write!(f, "RegMultiSz"),
            ValueType::ResourceList => write!(f, "RegResourceList"),
            ValueType::FullResourceDescriptor => write!(f, "RegFullResourceDescriptor"),
            ValueType::ResourceRequirementsList => write!(f, "RegResourceRequirementsList"),
            ValueType::Qword => write!(f, "RegQword"),
            ValueType::Unknown(raw) => write!(f, "RegUnknown(0x{raw:x})"),
        }
    }
}

/// A named data record held inside a [`Key`].
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub name: String,
    pub value_type: ValueType,
    /// Raw payload, exactly the logical data length.
    pub data: Vec<u8>,
    /// Bytes past the logical data length inside the data cell.
    pub slack: Vec<u8>,
    /// Recovered from free space rather than reachable from the live tree.
    pub deleted: bool,
}

impl Value {
    pub fn new(name: impl Into<String>, value_type: ValueType, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value_type,
            data,
            slack: Vec::new(),
            deleted: false,
        }
    }

    pub fn with_slack(mut self, slack: Vec<u8>) -> Self {
        self.slack = slack;
        self
    }

    pub fn deleted(mut self, deleted: bool) -> Self {
        self.deleted = deleted;
        self
    }

    /// Raw payload length in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Textual rendering of the payload.
    ///
    /// String types decode as UTF-16LE, integer types print in decimal and
    /// everything else renders as dash-separated upper-case hex.
    pub fn data_text(&self) -> String {
        match self.value_type {
            ValueType::Sz | ValueType::ExpandSz | ValueType::Link => {
                decode_utf16le(&self.data).trim_end_matches('\0').to_string()
            }
            ValueType::MultiSz => decode_utf16le(&self.data)
                .split('\0')
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            ValueType::Dword if self.data.len() == 4 => {
                u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
                    .to_string()
            }
            ValueType::DwordBigEndian if self.data.len() == 4 => {
                u32::from_be_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
                    .to_string()
            }
            ValueType::Qword if self.data.len() == 8 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&self.data);
                u64::from_le_bytes(raw).to_string()
            }
            _ => hex_string(&self.data),
        }
    }

    /// Textual rendering of the slack bytes, always hex.
    pub fn slack_text(&self) -> String {
        hex_string(&self.slack)
    }
}

/// A hive key: a named container of values and subkeys.
#[derive(Debug, Clone, PartialEq)]
pub struct Key {
    /// Full path including the root key's own name, `\` separated.
    pub path: String,
    pub name: String,
    pub last_write: Option<DateTime<Utc>>,
    pub values: Vec<Value>,
    pub subkeys: Vec<Key>,
    pub deleted: bool,
}

impl Key {
    /// Create a root key; its path is its name.
    pub fn root(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: name.clone(),
            name,
            last_write: None,
            values: Vec::new(),
            subkeys: Vec::new(),
            deleted: false,
        }
    }

    /// Create a child of `parent_path`.
    pub fn child(parent_path: &str, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            path: format!("{parent_path}\\{name}"),
            ..Self::root(name)
        }
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Full recursive text representation of this key and everything below it.
    ///
    /// Paths are shown without the leading `root_name`; timestamps use
    /// `timestamp_format` (see [`format_timestamp`]).
    pub fn dump(&self, root_name: &str, timestamp_format: &str) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0, root_name, timestamp_format);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize, root_name: &str, timestamp_format: &str) {
        let pad = "  ".repeat(depth);
        let last_write = self
            .last_write
            .map(|ts| format_timestamp(&ts, timestamp_format))
            .unwrap_or_else(|| "(none)".to_string());
        let deleted = if self.deleted { " (deleted)" } else { "" };
        let path = display_path(&self.path, root_name);

        // Writing into a String cannot fail.
        let _ = writeln!(out, "{pad}Key: {path}{deleted}");
        let _ = writeln!(out, "{pad}Last write time: {last_write}");
        let _ = writeln!(out, "{pad}Values: {}", self.values.len());
        for value in &self.values {
            let _ = write!(
                out,
                "{pad}  {} ({}): {}",
                value.name,
                value.value_type,
                value.data_text()
            );
            if !value.slack.is_empty() {
                let _ = write!(out, " (Slack: {})", value.slack_text());
            }
            out.push('\n');
        }
        let _ = writeln!(out, "{pad}Subkeys: {}", self.subkeys.len());
        for subkey in &self.subkeys {
            subkey.dump_into(out, depth + 1, root_name, timestamp_format);
        }
    }
}

/// A single search result, borrowed from the store that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hit<'h> {
    Key { key: &'h Key },
    Value { key: &'h Key, value: &'h Value },
}

impl<'h> Hit<'h> {
    /// The key that owns the match.
    pub fn key(&self) -> &'h Key {
        match self {
            Hit::Key { key } | Hit::Value { key, .. } => key,
        }
    }

    pub fn value(&self) -> Option<&'h Value> {
        match self {
            Hit::Key { .. } => None,
            Hit::Value { value, .. } => Some(value),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format `ts` with a chrono strftime layout extended with `%.7f`.
///
/// Fails when `format` holds a specifier chrono rejects.
pub fn write_timestamp<W: fmt::Write>(
    out: &mut W,
    ts: &DateTime<Utc>,
    format: &str,
) -> fmt::Result {
    let ticks = (ts.timestamp_subsec_nanos() / 100) % 10_000_000;
    for (i, part) in format.split(TICKS_SPECIFIER).enumerate() {
        if i > 0 {
            write!(out, ".{ticks:07}")?;
        }
        if !part.is_empty() {
            write!(out, "{}", ts.format(part))?;
        }
    }
    Ok(())
}

/// [`write_timestamp`] into a string, falling back to RFC 3339 when the
/// layout is invalid.
pub fn format_timestamp(ts: &DateTime<Utc>, format: &str) -> String {
    let mut s = String::new();
    match write_timestamp(&mut s, ts, format) {
        Ok(()) => s,
        Err(_) => ts.to_rfc3339(),
    }
}

/// Render bytes as `41-42-43`.
pub fn hex_string(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join("-")
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    #[test]
    fn string_data_decodes_and_trims_terminator() {
        let value = Value::new("Path", ValueType::Sz, utf16("C:\\Windows\0"));
        assert_eq!(value.data_text(), "C:\\Windows");
    }

    #[test]
    fn multi_string_joins_entries() {
        let value = Value::new("List", ValueType::MultiSz, utf16("one\0two\0\0"));
        assert_eq!(value.data_text(), "one two");
    }

    #[test]
    fn dword_renders_decimal() {
        let value = Value::new("Start", ValueType::Dword, 4u32.to_le_bytes().to_vec());
        assert_eq!(value.data_text(), "4");
    }

    #[test]
    fn short_dword_falls_back_to_hex() {
        let value = Value::new("Broken", ValueType::Dword, vec![0x01, 0x02]);
        assert_eq!(value.data_text(), "01-02");
    }

    #[test]
    fn binary_and_slack_render_as_hex() {
        let value = Value::new("Blob", ValueType::Binary, b"AB".to_vec()).with_slack(vec![0, 0xff]);
        assert_eq!(value.data_text(), "41-42");
        assert_eq!(value.slack_text(), "00-FF");
    }

    #[test]
    fn child_path_extends_parent() {
        let key = Key::child("ROOT\\Software", "Vendor");
        assert_eq!(key.path, "ROOT\\Software\\Vendor");
        assert_eq!(key.name, "Vendor");
    }

    #[test]
    fn value_lookup_ignores_case() {
        let mut key = Key::root("ROOT");
        key.values.push(Value::new("Version", ValueType::Sz, utf16("1.0")));
        assert!(key.value("version").is_some());
        assert!(key.value("missing").is_none());
    }

    #[test]
    fn dump_recurses_into_subkeys() {
        let mut root = Key::root("ROOT");
        let mut child = Key::child("ROOT", "Software");
        child
            .values
            .push(Value::new("Blob", ValueType::Binary, vec![1]).with_slack(vec![2]));
        root.subkeys.push(child);

        let dump = root.dump("ROOT", DEFAULT_TIMESTAMP_FORMAT);
        assert!(dump.contains("Key: ROOT\n"));
        assert!(dump.contains("  Key: Software\n"));
        assert!(dump.contains("    Blob (RegBinary): 01 (Slack: 02)\n"));
    }

    #[test]
    fn dump_formats_last_write_times() {
        let mut root = Key::root("ROOT");
        let mut child = Key::child("ROOT", "Beta");
        child.last_write = Some(
            Utc.with_ymd_and_hms(2021, 6, 15, 8, 30, 0).unwrap()
                + chrono::Duration::nanoseconds(123_456_789),
        );
        root.subkeys.push(child);

        let dump = root.dump("ROOT", DEFAULT_TIMESTAMP_FORMAT);
        assert!(dump.contains("Last write time: (none)\n"));
        assert!(dump.contains("  Key: Beta\n  Last write time: 2021-06-15 08:30:00.1234567\n"));
    }

    #[test]
    fn ticks_specifier_expands_to_seven_digits() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            format_timestamp(&ts, DEFAULT_TIMESTAMP_FORMAT),
            "2020-01-01 00:00:00.0000000"
        );
        assert_eq!(format_timestamp(&ts, "%.7f|%Y"), ".0000000|2020");
        assert_eq!(format_timestamp(&ts, "%d/%m"), "01/01");
    }

    #[test]
    fn invalid_layout_is_an_error_not_a_panic() {
        let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut s = String::new();
        assert!(write_timestamp(&mut s, &ts, "%Q").is_err());
        assert_eq!(format_timestamp(&ts, "%Q%.7f"), "2020-01-01T00:00:00+00:00");
    }

    #[test]
    fn value_type_names_round_trip() {
        for raw in 0..=11 {
            let ty = ValueType::from_raw(raw);
            assert_eq!(ValueType::from_name(&ty.to_string()), Some(ty));
        }
        assert_eq!(ValueType::from_raw(0x20), ValueType::Unknown(0x20));
    }
}
