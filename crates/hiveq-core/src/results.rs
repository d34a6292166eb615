//! Result processing: ordering, display paths and the summary line.

use std::time::Duration;

use crate::criteria::{DataField, NameField, SearchCriteria};
use crate::types::Hit;

/// Stable ascending sort by the mode's key. Ties keep store order.
///
/// | Mode | Key |
/// |------|-----|
/// | size threshold | raw value length |
/// | time range | key last-write (missing = Unix epoch) |
/// | key name search | key name, ignoring case |
/// | value name search | value name, ignoring case |
/// | data / slack search | rendered value data |
pub fn sort_hits(hits: &mut [Hit<'_>], criteria: &SearchCriteria) {
    match criteria {
        SearchCriteria::SizeThreshold { .. } => {
            hits.sort_by_key(|h| h.value().map_or(0, |v| v.size()));
        }
        SearchCriteria::TimeRange(_) => {
            // `DateTime<Utc>::default()` is the Unix epoch.
            hits.sort_by_key(|h| h.key().last_write.unwrap_or_default());
        }
        SearchCriteria::NameSearch {
            field: NameField::Key,
            ..
        } => {
            hits.sort_by_cached_key(|h| h.key().name.to_lowercase());
        }
        SearchCriteria::NameSearch {
            field: NameField::Value,
            ..
        } => {
            hits.sort_by_cached_key(|h| h.value().map(|v| v.name.to_lowercase()).unwrap_or_default());
        }
        SearchCriteria::DataSearch { .. } => {
            hits.sort_by_cached_key(|h| h.value().map(|v| v.data_text()).unwrap_or_default());
        }
        SearchCriteria::SingleValue { .. } | SearchCriteria::SingleKey { .. } => {}
    }
}

/// `path` with the root key's own name removed.
pub fn display_path<'a>(path: &'a str, root_name: &str) -> &'a str {
    path.strip_prefix(root_name)
        .and_then(|rest| rest.strip_prefix('\\'))
        .unwrap_or(path)
}

/// Plural suffix for `count`.
pub fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// The trailing "Found N things" line for a search mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub count: usize,
    pub noun: &'static str,
    pub description: String,
}

impl Summary {
    /// `None` for the single key/value lookups, which report no count.
    pub fn new(criteria: &SearchCriteria, count: usize) -> Option<Self> {
        let (noun, description) = match criteria {
            SearchCriteria::SingleValue { .. } | SearchCriteria::SingleKey { .. } => return None,
            SearchCriteria::SizeThreshold { min_bytes } => {
                ("value", format!("with size >= {min_bytes} bytes"))
            }
            SearchCriteria::TimeRange(range) => ("key", format!("with last write in {range}")),
            SearchCriteria::NameSearch { field, term, .. } => match field {
                NameField::Key => ("key", format!("with name matching '{term}'")),
                NameField::Value => ("value", format!("with name matching '{term}'")),
            },
            SearchCriteria::DataSearch { field, term, .. } => match field {
                DataField::Data => ("value", format!("with data matching '{term}'")),
                DataField::Slack => ("value", format!("with slack matching '{term}'")),
            },
        };
        Some(Self {
            count,
            noun,
            description,
        })
    }

    pub fn line(&self, elapsed: Duration) -> String {
        format!(
            "Found {} {}{} {} (search took {:.4}s)",
            self.count,
            self.noun,
            plural(self.count),
            self.description,
            elapsed.as_secs_f64()
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
