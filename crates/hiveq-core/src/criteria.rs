//! Mode selection: turns typed arguments into exactly one [`SearchCriteria`].
//!
//! Precedence, highest first:
//!
//! | Inputs | Mode |
//! |--------|------|
//! | key name + value name | [`SearchCriteria::SingleValue`] |
//! | key name | [`SearchCriteria::SingleKey`] |
//! | minimum size > 0 | [`SearchCriteria::SizeThreshold`] |
//! | start and/or end date | [`SearchCriteria::TimeRange`] |
//! | first non-empty of `sk`, `sv`, `sd`, `ss` | name or data search |
//!
//! Later rows are never consulted once an earlier one matches.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;
use tracing::debug;

use crate::error::QueryError;

/// Naive layouts accepted for dates without an explicit offset. Such dates
/// are taken as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Layouts carrying an explicit offset, tried after RFC 3339.
const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Query-relevant arguments, already parsed from the command line.
///
/// Empty strings are treated the same as absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryArgs {
    pub key_name: Option<String>,
    pub value_name: Option<String>,
    pub min_size: u64,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// `--sk`: search key names.
    pub search_keys: Option<String>,
    /// `--sv`: search value names.
    pub search_values: Option<String>,
    /// `--sd`: search value data.
    pub search_data: Option<String>,
    /// `--ss`: search value slack.
    pub search_slack: Option<String>,
    pub regex: bool,
    pub literal: bool,
    pub recursive: bool,
}

// ---------------------------------------------------------------------------
// Criteria
// ---------------------------------------------------------------------------

/// Which name a [`SearchCriteria::NameSearch`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameField {
    Key,
    Value,
}

/// Which byte region a [`SearchCriteria::DataSearch`] looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataField {
    Data,
    Slack,
}

/// Last-write bounds, inclusive at both ends. At least one bound is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// Returns `None` when both bounds are absent.
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Option<Self> {
        if start.is_none() && end.is_none() {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| ts >= start) && self.end.map_or(true, |end| ts <= end)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<DateTime<Utc>>| {
            b.map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "*".to_string())
        };
        write!(f, "{} .. {}", bound(self.start), bound(self.end))
    }
}

/// The single query mode for this run. Immutable once selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    SingleValue {
        key_path: String,
        value_name: String,
    },
    SingleKey {
        key_path: String,
        recursive: bool,
    },
    SizeThreshold {
        min_bytes: u64,
    },
    TimeRange(TimeRange),
    NameSearch {
        field: NameField,
        term: String,
        is_regex: bool,
    },
    DataSearch {
        field: DataField,
        term: String,
        is_regex: bool,
        literal: bool,
    },
}

impl SearchCriteria {
    /// Pick the mode for `args`.
    ///
    /// `Ok(None)` means nothing was asked for. A supplied date that does not
    /// parse is an error; an absent one just leaves that bound open.
    pub fn select(args: &QueryArgs) -> Result<Option<Self>, QueryError> {
        let key_name = non_empty(&args.key_name);
        let value_name = non_empty(&args.value_name);

        let criteria = if let (Some(key_path), Some(value_name)) = (key_name, value_name) {
            SearchCriteria::SingleValue {
                key_path: key_path.to_string(),
                value_name: value_name.to_string(),
            }
        } else if let Some(key_path) = key_name {
            SearchCriteria::SingleKey {
                key_path: key_path.to_string(),
                recursive: args.recursive,
            }
        } else if args.min_size > 0 {
            SearchCriteria::SizeThreshold {
                min_bytes: args.min_size,
            }
        } else if let Some(range) = select_time_range(args)? {
            SearchCriteria::TimeRange(range)
        } else if let Some(criteria) = select_term_search(args) {
            criteria
        } else {
            return Ok(None);
        };

        debug!(?criteria, "criteria: mode selected");
        Ok(Some(criteria))
    }

    /// The user-supplied search term, for the modes that have one.
    pub fn term(&self) -> Option<&str> {
        match self {
            SearchCriteria::NameSearch { term, .. } | SearchCriteria::DataSearch { term, .. } => {
                Some(term)
            }
            _ => None,
        }
    }
}

fn select_time_range(args: &QueryArgs) -> Result<Option<TimeRange>, QueryError> {
    let start_text = non_empty(&args.start_date);
    let end_text = non_empty(&args.end_date);
    if start_text.is_none() && end_text.is_none() {
        return Ok(None);
    }

    let start = parse_timestamp(start_text).map_err(|e| QueryError::invalid_date("start", e))?;
    let end = parse_timestamp(end_text).map_err(|e| QueryError::invalid_date("end", e))?;
    Ok(TimeRange::new(start, end))
}

fn select_term_search(args: &QueryArgs) -> Option<SearchCriteria> {
    if let Some(term) = non_empty(&args.search_keys) {
        return Some(name_search(NameField::Key, term, args));
    }
    if let Some(term) = non_empty(&args.search_values) {
        return Some(name_search(NameField::Value, term, args));
    }
    if let Some(term) = non_empty(&args.search_data) {
        return Some(data_search(DataField::Data, term, args));
    }
    if let Some(term) = non_empty(&args.search_slack) {
        return Some(data_search(DataField::Slack, term, args));
    }
    None
}

fn name_search(field: NameField, term: &str, args: &QueryArgs) -> SearchCriteria {
    SearchCriteria::NameSearch {
        field,
        term: term.to_string(),
        is_regex: args.regex,
    }
}

fn data_search(field: DataField, term: &str, args: &QueryArgs) -> SearchCriteria {
    SearchCriteria::DataSearch {
        field,
        term: term.to_string(),
        is_regex: args.regex,
        literal: args.literal,
    }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// A supplied date string that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse {input:?}: {reason}")]
pub struct DateParseError {
    pub input: String,
    pub reason: String,
}

/// Parse an optional user-supplied date.
///
/// `None` in, `Ok(None)` out. Input without an explicit offset is UTC.
/// Accepts RFC 3339, `YYYY-MM-DD[ T]HH:MM[:SS[.fff]]` with or without an
/// offset, and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(input: Option<&str>) -> Result<Option<DateTime<Utc>>, DateParseError> {
    let Some(raw) = input else {
        return Ok(None);
    };
    let s = raw.trim();
    if s.is_empty() {
        return Ok(None);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(Some(ts.with_timezone(&Utc)));
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(s, fmt) {
            return Ok(Some(ts.with_timezone(&Utc)));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Some(ts.and_utc()));
        }
    }
    match NaiveDate::parse_from_str(s, DATE_FORMAT) {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|ts| Some(ts.and_utc()))
            .ok_or_else(|| DateParseError {
                input: raw.to_string(),
                reason: "date has no midnight".to_string(),
            }),
        Err(err) => Err(DateParseError {
            input: raw.to_string(),
            reason: format!("unrecognised date/time format ({err})"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
