//! Output rendering: one line per hit, or a block for a single key/value.
//!
//! Hit line shape depends on what was searched:
//!
//! | Mode | Line |
//! |------|------|
//! | key name | `Key: <path>` |
//! | value name | `Key: <path>, Value: <name>` |
//! | value data | `Key: <path>, Value: <name>, Data: <data>` |
//! | value slack | `Key: <path>, Value: <name>, Slack: <slack>` |
//! | size threshold | `Key: <path>, Value: <name>, Size: <n>` |
//! | time range | `Key: <path>, Last write: <ts>` |
//!
//! Paths are shown without the root key's name. Hit lines go through the
//! highlighter; the summary line never does.

use std::io::{self, Write};
use std::time::Duration;

use chrono::{DateTime, Utc};
use hiveq_core::criteria::DataField;
use hiveq_core::results::{display_path, Summary};
use hiveq_core::types::format_timestamp;
use hiveq_core::{Hit, Key, SearchCriteria, Value};

use crate::highlight::Highlighter;
use crate::theme::OutputStyle;

const SECTION_RULE: &str = "------------";

pub struct Renderer<'a> {
    highlighter: &'a Highlighter,
    style: &'a OutputStyle,
    root_name: &'a str,
    suppress_data: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(highlighter: &'a Highlighter, style: &'a OutputStyle, root_name: &'a str) -> Self {
        Self {
            highlighter,
            style,
            root_name,
            suppress_data: false,
        }
    }

    /// Leave data and slack out of data/slack search lines.
    pub fn suppress_data(mut self, suppress: bool) -> Self {
        self.suppress_data = suppress;
        self
    }

    // ── Search hits ───────────────────────────────────────────────────────

    /// The plain text of one hit line.
    pub fn hit_line(&self, hit: &Hit<'_>, criteria: &SearchCriteria) -> String {
        let mut line = format!("Key: {}", self.path(hit.key()));
        if let SearchCriteria::TimeRange(_) = criteria {
            line.push_str(&format!(", Last write: {}", self.timestamp(hit.key().last_write)));
            return line;
        }
        let Some(value) = hit.value() else {
            return line;
        };

        line.push_str(&format!(", Value: {}", value.name));
        match criteria {
            SearchCriteria::SizeThreshold { .. } => {
                line.push_str(&format!(", Size: {}", value.size()));
            }
            SearchCriteria::DataSearch { .. } if self.suppress_data => {}
            SearchCriteria::DataSearch {
                field: DataField::Data,
                ..
            } => {
                line.push_str(&format!(", Data: {}", value.data_text()));
            }
            SearchCriteria::DataSearch {
                field: DataField::Slack,
                ..
            } => {
                line.push_str(&format!(", Slack: {}", value.slack_text()));
            }
            SearchCriteria::NameSearch { .. }
            | SearchCriteria::SingleKey { .. }
            | SearchCriteria::SingleValue { .. }
            | SearchCriteria::TimeRange(_) => {}
        }
        if value.deleted {
            line.push_str(" (deleted)");
        }
        line
    }

    pub fn write_hits<W: Write>(
        &self,
        out: &mut W,
        hits: &[Hit<'_>],
        criteria: &SearchCriteria,
    ) -> io::Result<()> {
        for hit in hits {
            let line = self.hit_line(hit, criteria);
            writeln!(out, "{}", self.highlighter.paint(&line))?;
        }
        Ok(())
    }

    pub fn write_summary<W: Write>(
        &self,
        out: &mut W,
        summary: &Summary,
        elapsed: Duration,
    ) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", summary.line(elapsed))
    }

    // ── Single key / value ────────────────────────────────────────────────

    /// Flat summary of `key`, or its full recursive dump.
    pub fn write_key<W: Write>(&self, out: &mut W, key: &Key, recursive: bool) -> io::Result<()> {
        if recursive {
            let dump = key.dump(self.root_name, &self.style.timestamp_format);
            return out.write_all(dump.as_bytes());
        }

        writeln!(out, "Key path: {}", self.path(key))?;
        writeln!(out, "Last write time: {}", self.timestamp(key.last_write))?;
        writeln!(out, "Value count: {}", key.values.len())?;
        writeln!(out, "Subkey count: {}", key.subkeys.len())?;

        if !key.subkeys.is_empty() {
            writeln!(out)?;
            writeln!(out, "{SECTION_RULE} Subkeys {SECTION_RULE}")?;
            for (i, subkey) in key.subkeys.iter().enumerate() {
                writeln!(
                    out,
                    "{i}: {} (Last write: {}){}",
                    subkey.name,
                    self.timestamp(subkey.last_write),
                    deleted_marker(subkey.deleted)
                )?;
            }
        }

        if !key.values.is_empty() {
            writeln!(out)?;
            writeln!(out, "{SECTION_RULE} Values {SECTION_RULE}")?;
            for (i, value) in key.values.iter().enumerate() {
                writeln!(out, "{SECTION_RULE} Value #{i} {SECTION_RULE}")?;
                writeln!(out, "Name: {}{}", value.name, deleted_marker(value.deleted))?;
                writeln!(out, "Type: {}", value.value_type)?;
                write!(out, "Data: {}", value.data_text())?;
                if !value.slack.is_empty() {
                    write!(out, " (Slack: {})", value.slack_text())?;
                }
                writeln!(out)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }

    pub fn write_value<W: Write>(&self, out: &mut W, key: &Key, value: &Value) -> io::Result<()> {
        writeln!(out, "Key path: {}", self.path(key))?;
        writeln!(out, "Value name: {}{}", value.name, deleted_marker(value.deleted))?;
        writeln!(out, "Value type: {}", value.value_type)?;
        writeln!(out, "Size: {} bytes", value.size())?;
        writeln!(out, "Data: {}", value.data_text())?;
        if !value.slack.is_empty() {
            writeln!(out, "Slack: {}", value.slack_text())?;
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    fn path<'k>(&self, key: &'k Key) -> &'k str {
        display_path(&key.path, self.root_name)
    }

    fn timestamp(&self, ts: Option<DateTime<Utc>>) -> String {
        match ts {
            Some(ts) => format_timestamp(&ts, &self.style.timestamp_format),
            None => "(none)".to_string(),
        }
    }
}

fn deleted_marker(deleted: bool) -> &'static str {
    if deleted {
        " (deleted)"
    } else {
        ""
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
