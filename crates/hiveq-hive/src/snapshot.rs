//! JSON hive snapshots.
//!
//! A snapshot is a serialized key tree, handy for fixtures and for hives
//! exported by other tools:
//!
//! ```json
//! {
//!   "root": {
//!     "name": "ROOT",
//!     "last_write": "2021-06-15T08:30:00Z",
//!     "values": [
//!       { "name": "Version", "type": "RegSz", "text": "1.0" },
//!       { "name": "Start", "type": "RegDword", "dword": 4 },
//!       { "name": "Blob", "type": "RegBinary", "hex": "DE-AD", "slack": "41-00" }
//!     ],
//!     "subkeys": [ { "name": "Software", "deleted": true } ]
//!   }
//! }
//! ```
//!
//! Value payloads come from exactly one of `text` (UTF-16LE, NUL terminated;
//! `REG_MULTI_SZ` takes an array), `dword`, `qword` or `hex`. A value with
//! none of them is empty.

use chrono::{DateTime, Utc};
use hiveq_core::{Key, Value, ValueType};
use serde::Deserialize;

use crate::LoadError;

#[derive(Debug, Deserialize)]
struct Snapshot {
    root: SnapshotKey,
}

#[derive(Debug, Deserialize)]
struct SnapshotKey {
    name: String,
    #[serde(default)]
    last_write: Option<DateTime<Utc>>,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    values: Vec<SnapshotValue>,
    #[serde(default)]
    subkeys: Vec<SnapshotKey>,
}

#[derive(Debug, Deserialize)]
struct SnapshotValue {
    name: String,
    #[serde(rename = "type", default = "default_type")]
    value_type: String,
    #[serde(default)]
    text: Option<Text>,
    #[serde(default)]
    dword: Option<u32>,
    #[serde(default)]
    qword: Option<u64>,
    #[serde(default)]
    hex: Option<String>,
    #[serde(default)]
    slack: Option<String>,
    #[serde(default)]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Text {
    One(String),
    Many(Vec<String>),
}

fn default_type() -> String {
    "RegBinary".to_string()
}

/// Parse snapshot bytes into an owned key tree.
pub fn parse(bytes: &[u8]) -> Result<Key, LoadError> {
    let snapshot: Snapshot = serde_json::from_slice(bytes)?;
    let root = snapshot.root;
    let mut key = Key::root(root.name.clone());
    fill(&mut key, root)?;
    Ok(key)
}

fn fill(key: &mut Key, raw: SnapshotKey) -> Result<(), LoadError> {
    key.last_write = raw.last_write;
    key.deleted = raw.deleted;
    key.values = raw
        .values
        .into_iter()
        .map(convert_value)
        .collect::<Result<_, _>>()?;
    for raw_child in raw.subkeys {
        let mut child = Key::child(&key.path, raw_child.name.clone());
        fill(&mut child, raw_child)?;
        key.subkeys.push(child);
    }
    Ok(())
}

fn convert_value(raw: SnapshotValue) -> Result<Value, LoadError> {
    let invalid = |reason: String| LoadError::InvalidValue {
        value: raw.name.clone(),
        reason,
    };

    let value_type = ValueType::from_name(&raw.value_type)
        .ok_or_else(|| invalid(format!("unknown value type {:?}", raw.value_type)))?;

    let data = match (&raw.text, raw.dword, raw.qword, &raw.hex) {
        (Some(text), None, None, None) => encode_text(text),
        (None, Some(n), None, None) => n.to_le_bytes().to_vec(),
        (None, None, Some(n), None) => n.to_le_bytes().to_vec(),
        (None, None, None, Some(hex)) => parse_hex(hex).map_err(invalid)?,
        (None, None, None, None) => Vec::new(),
        _ => return Err(invalid("more than one of text, dword, qword, hex".into())),
    };
    let slack = match &raw.slack {
        Some(hex) => parse_hex(hex).map_err(invalid)?,
        None => Vec::new(),
    };

    Ok(Value::new(raw.name.clone(), value_type, data)
        .with_slack(slack)
        .deleted(raw.deleted))
}

fn encode_text(text: &Text) -> Vec<u8> {
    let mut units: Vec<u16> = Vec::new();
    match text {
        Text::One(s) => {
            units.extend(s.encode_utf16());
            units.push(0);
        }
        Text::Many(items) => {
            for s in items {
                units.extend(s.encode_utf16());
                units.push(0);
            }
            units.push(0);
        }
    }
    units.into_iter().flat_map(u16::to_le_bytes).collect()
}

/// Hex digits, optionally separated by `-`, `:` or whitespace.
fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !matches!(b, b'-' | b':') && !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {input:?}"));
    }
    digits
        .chunks(2)
        .map(|pair| {
            let hi = hex_digit(pair[0]);
            let lo = hex_digit(pair[1]);
            match (hi, lo) {
                (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
                _ => Err(format!("invalid hex in {input:?}")),
            }
        })
        .collect()
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "root": {
            "name": "ROOT",
            "subkeys": [{
                "name": "Software",
                "last_write": "2021-06-15T08:30:00Z",
                "values": [
                    { "name": "Version", "type": "RegSz", "text": "1.0" },
                    { "name": "Paths", "type": "RegMultiSz", "text": ["a", "b"] },
                    { "name": "Start", "type": "RegDword", "dword": 4 },
                    { "name": "Blob", "hex": "de-ad", "slack": "41 00", "deleted": true }
                ],
                "subkeys": [{ "name": "Vendor" }]
            }]
        }
    }"#;

    #[test]
    fn builds_paths_and_metadata() {
        let root = parse(SAMPLE.as_bytes()).unwrap();
        let software = &root.subkeys[0];
        assert_eq!(software.path, "ROOT\\Software");
        assert_eq!(software.subkeys[0].path, "ROOT\\Software\\Vendor");
        assert_eq!(
            software.last_write,
            Some(Utc.with_ymd_and_hms(2021, 6, 15, 8, 30, 0).unwrap())
        );
        assert_eq!(root.last_write, None);
    }

    #[test]
    fn decodes_value_payloads() {
        let root = parse(SAMPLE.as_bytes()).unwrap();
        let values = &root.subkeys[0].values;
        assert_eq!(values[0].data_text(), "1.0");
        assert_eq!(values[1].data_text(), "a b");
        assert_eq!(values[2].data_text(), "4");
        assert_eq!(values[3].value_type, ValueType::Binary);
        assert_eq!(values[3].data, vec![0xde, 0xad]);
        assert_eq!(values[3].slack, vec![0x41, 0x00]);
        assert!(values[3].deleted);
    }

    #[test]
    fn rejects_unknown_types() {
        let err = parse(br#"{"root":{"name":"R","values":[{"name":"x","type":"RegBogus"}]}}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { ref value, .. } if value == "x"));
    }

    #[test]
    fn rejects_ambiguous_payloads() {
        let err = parse(br#"{"root":{"name":"R","values":[{"name":"x","dword":1,"hex":"00"}]}}"#)
            .unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { .. }));
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(parse_hex("ABC").is_err());
        assert!(parse_hex("ZZ").is_err());
        assert_eq!(parse_hex("").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_hex("0a:FF").unwrap(), vec![0x0a, 0xff]);
    }

    #[test]
    fn malformed_json_is_a_snapshot_error() {
        assert!(matches!(parse(b"{"), Err(LoadError::Snapshot(_))));
    }
}
