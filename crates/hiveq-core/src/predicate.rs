//! Predicate building: the concrete match description for a search mode.
//!
//! A plain-text search over data or slack matches the rendered text, and also
//! looks for the term's byte encodings in the raw payload: string types render
//! decoded, integers in decimal, so ASCII bytes inside them never show up in
//! the text. [`TermEncodings`] derives both forms once. The store scans raw
//! bytes for them; the highlighter paints their hex rendering.

use tracing::debug;

use crate::criteria::{DataField, NameField, SearchCriteria, TimeRange};
use crate::types::hex_string;

/// What a search mode asks the store for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    ValueSize { min_bytes: u64 },
    LastWrite(TimeRange),
    KeyName(NamePattern),
    ValueName(NamePattern),
    ValueData(DataPattern),
    ValueSlack(DataPattern),
}

/// A key or value name search. Names are always text, so no encodings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    pub term: String,
    pub is_regex: bool,
}

/// A search over rendered value data or slack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPattern {
    pub term: String,
    pub is_regex: bool,
    /// Match only the term as given; skip the encoding fallback.
    pub literal: bool,
    /// Present for every non-regex term.
    pub encodings: Option<TermEncodings>,
}

impl DataPattern {
    pub fn new(term: impl Into<String>, is_regex: bool, literal: bool) -> Self {
        let term = term.into();
        let encodings = (!is_regex).then(|| TermEncodings::of(&term));
        Self {
            term,
            is_regex,
            literal,
            encodings,
        }
    }

    /// Byte sequences the store must also look for in raw data, in order.
    /// Empty for regex and literal searches.
    pub fn encoded_candidates(&self) -> Vec<&[u8]> {
        match (&self.encodings, self.literal) {
            (Some(enc), false) => vec![&enc.single_byte_bytes[..], &enc.utf16le_bytes[..]],
            _ => Vec::new(),
        }
    }
}

/// The two byte encodings of a search term, raw and rendered the way binary
/// data renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermEncodings {
    /// One byte per character (Latin-1; wider characters become `?`).
    pub single_byte_bytes: Vec<u8>,
    /// UTF-16 little-endian.
    pub utf16le_bytes: Vec<u8>,
    /// `single_byte_bytes` as dash-separated hex.
    pub single_byte: String,
    /// `utf16le_bytes` as dash-separated hex.
    pub utf16le: String,
}

impl TermEncodings {
    pub fn of(term: &str) -> Self {
        let single_byte_bytes = single_byte_bytes(term);
        let utf16le_bytes = utf16le_bytes(term);
        Self {
            single_byte: hex_string(&single_byte_bytes),
            utf16le: hex_string(&utf16le_bytes),
            single_byte_bytes,
            utf16le_bytes,
        }
    }
}

/// Build the predicate for a search mode. Single key/value lookups have none.
pub fn build(criteria: &SearchCriteria) -> Option<Predicate> {
    let predicate = match criteria {
        SearchCriteria::SingleValue { .. } | SearchCriteria::SingleKey { .. } => return None,
        SearchCriteria::SizeThreshold { min_bytes } => Predicate::ValueSize {
            min_bytes: *min_bytes,
        },
        SearchCriteria::TimeRange(range) => Predicate::LastWrite(*range),
        SearchCriteria::NameSearch {
            field,
            term,
            is_regex,
        } => {
            let pattern = NamePattern {
                term: term.clone(),
                is_regex: *is_regex,
            };
            match field {
                NameField::Key => Predicate::KeyName(pattern),
                NameField::Value => Predicate::ValueName(pattern),
            }
        }
        SearchCriteria::DataSearch {
            field,
            term,
            is_regex,
            literal,
        } => {
            let pattern = DataPattern::new(term.clone(), *is_regex, *literal);
            match field {
                DataField::Data => Predicate::ValueData(pattern),
                DataField::Slack => Predicate::ValueSlack(pattern),
            }
        }
    };
    debug!(?predicate, "predicate: built");
    Some(predicate)
}

fn single_byte_bytes(term: &str) -> Vec<u8> {
    term.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn utf16le_bytes(term: &str) -> Vec<u8> {
    term.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
