//! In-memory [`HiveStore`] over an owned [`Key`] tree.
//!
//! Loaders build one of these from a hive file; tests build one by hand.
//! Traversal is depth-first pre-order, subkeys and values in stored order.
//! Deleted keys and values are invisible unless the hive was opened with
//! recovery enabled.

use regex::{Regex, RegexBuilder};

use crate::criteria::TimeRange;
use crate::error::StoreError;
use crate::predicate::DataPattern;
use crate::store::HiveStore;
use crate::types::{Hit, Key, Value};

#[derive(Debug, Clone)]
pub struct MemoryHive {
    root: Key,
    recover: bool,
}

impl MemoryHive {
    pub fn new(root: Key) -> Self {
        Self {
            root,
            recover: false,
        }
    }

    /// Include deleted keys and values in lookups and searches.
    pub fn with_recovery(mut self, recover: bool) -> Self {
        self.recover = recover;
        self
    }

    /// Every visible key, pre-order.
    fn keys(&self) -> Vec<&Key> {
        let mut out = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(key) = stack.pop() {
            out.push(key);
            stack.extend(self.subkeys(key).rev());
        }
        out
    }

    fn subkeys<'a>(&'a self, key: &'a Key) -> impl DoubleEndedIterator<Item = &'a Key> + 'a {
        key.subkeys.iter().filter(move |k| self.recover || !k.deleted)
    }

    fn values<'a>(&'a self, key: &'a Key) -> impl Iterator<Item = &'a Value> + 'a {
        key.values.iter().filter(move |v| self.recover || !v.deleted)
    }

    fn value_hits<F>(&self, mut matches: F) -> Vec<Hit<'_>>
    where
        F: FnMut(&Value) -> bool,
    {
        let mut hits = Vec::new();
        for key in self.keys() {
            for value in self.values(key) {
                if matches(value) {
                    hits.push(Hit::Value { key, value });
                }
            }
        }
        hits
    }

    /// Match `pattern` against each value's rendered text, then against its
    /// raw bytes for the term's encodings.
    fn search_payload<R, B>(
        &self,
        pattern: &DataPattern,
        render: R,
        bytes: B,
    ) -> Result<Vec<Hit<'_>>, StoreError>
    where
        R: Fn(&Value) -> String,
        B: Fn(&Value) -> &[u8],
    {
        let matcher = Matcher::new(&pattern.term, pattern.is_regex)?;
        let candidates = pattern.encoded_candidates();
        Ok(self.value_hits(|value| {
            matcher.is_match(&render(value))
                || candidates
                    .iter()
                    .any(|needle| contains_bytes(bytes(value), needle))
        }))
    }
}

impl HiveStore for MemoryHive {
    fn root(&self) -> &Key {
        &self.root
    }

    fn get_key(&self, path: &str) -> Option<&Key> {
        let mut segments = path.split('\\').filter(|s| !s.is_empty()).peekable();
        if segments
            .peek()
            .is_some_and(|first| first.eq_ignore_ascii_case(&self.root.name))
        {
            segments.next();
        }

        let mut current = &self.root;
        for segment in segments {
            current = self
                .subkeys(current)
                .find(|k| k.name.eq_ignore_ascii_case(segment))?;
        }
        Some(current)
    }

    fn find_by_value_size(&self, min_bytes: u64) -> Result<Vec<Hit<'_>>, StoreError> {
        Ok(self.value_hits(|value| value.size() as u64 >= min_bytes))
    }

    fn find_by_last_write_time(&self, range: &TimeRange) -> Result<Vec<Hit<'_>>, StoreError> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| key.last_write.is_some_and(|ts| range.contains(ts)))
            .map(|key| Hit::Key { key })
            .collect())
    }

    fn find_in_key_name(&self, term: &str, is_regex: bool) -> Result<Vec<Hit<'_>>, StoreError> {
        let matcher = Matcher::new(term, is_regex)?;
        Ok(self
            .keys()
            .into_iter()
            .filter(|key| matcher.is_match(&key.name))
            .map(|key| Hit::Key { key })
            .collect())
    }

    fn find_in_value_name(&self, term: &str, is_regex: bool) -> Result<Vec<Hit<'_>>, StoreError> {
        let matcher = Matcher::new(term, is_regex)?;
        Ok(self.value_hits(|value| matcher.is_match(&value.name)))
    }

    fn find_in_value_data(&self, pattern: &DataPattern) -> Result<Vec<Hit<'_>>, StoreError> {
        self.search_payload(pattern, Value::data_text, |v| &v.data)
    }

    fn find_in_value_data_slack(
        &self,
        pattern: &DataPattern,
    ) -> Result<Vec<Hit<'_>>, StoreError> {
        self.search_payload(pattern, Value::slack_text, |v| &v.slack)
    }
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// Case-insensitive substring or regex matcher.
enum Matcher {
    Substring(String),
    Regex(Regex),
}

impl Matcher {
    fn new(term: &str, is_regex: bool) -> Result<Self, StoreError> {
        if !is_regex {
            return Ok(Matcher::Substring(term.to_lowercase()));
        }
        RegexBuilder::new(term)
            .case_insensitive(true)
            .build()
            .map(Matcher::Regex)
            .map_err(|source| StoreError::InvalidPattern {
                pattern: term.to_string(),
                source,
            })
    }

    fn is_match(&self, haystack: &str) -> bool {
        match self {
            Matcher::Substring(needle) => haystack.to_lowercase().contains(needle.as_str()),
            Matcher::Regex(re) => re.is_match(haystack),
        }
    }
}

/// ASCII case-insensitive subsequence search.
fn contains_bytes(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty()
        || haystack
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ValueType;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    /// ROOT
    /// ├── Software            (2020-01-01)
    /// │   └── Vendor          (2021-06-15)  Version=RegSz "1.0", Blob=RegBinary "hello" + slack
    /// └── System              (2022-12-31)  Start=RegDword 4, Gone (deleted)
    ///     └── Removed (deleted)
    fn hive() -> MemoryHive {
        let mut root = Key::root("ROOT");

        let mut software = Key::child("ROOT", "Software");
        software.last_write = Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        let mut vendor = Key::child(&software.path, "Vendor");
        vendor.last_write = Some(Utc.with_ymd_and_hms(2021, 6, 15, 0, 0, 0).unwrap());
        vendor
            .values
            .push(Value::new("Version", ValueType::Sz, utf16("1.0\0")));
        vendor.values.push(
            Value::new("Blob", ValueType::Binary, b"hello".to_vec()).with_slack(utf16("secret")),
        );
        software.subkeys.push(vendor);

        let mut system = Key::child("ROOT", "System");
        system.last_write = Some(Utc.with_ymd_and_hms(2022, 12, 31, 0, 0, 0).unwrap());
        system
            .values
            .push(Value::new("Start", ValueType::Dword, 4u32.to_le_bytes().to_vec()));
        system
            .values
            .push(Value::new("Gone", ValueType::Sz, utf16("old")).deleted(true));
        let mut removed = Key::child(&system.path, "Removed");
        removed.deleted = true;
        system.subkeys.push(removed);

        root.subkeys.push(software);
        root.subkeys.push(system);
        MemoryHive::new(root)
    }

    fn paths(hits: &[Hit<'_>]) -> Vec<String> {
        hits.iter()
            .map(|h| match h.value() {
                Some(v) => format!("{}:{}", h.key().path, v.name),
                None => h.key().path.clone(),
            })
            .collect()
    }

    #[test]
    fn get_key_accepts_paths_with_and_without_root() {
        let hive = hive();
        assert_eq!(hive.get_key("Software\\Vendor").unwrap().name, "Vendor");
        assert_eq!(hive.get_key("ROOT\\software\\VENDOR").unwrap().name, "Vendor");
        assert_eq!(hive.get_key("").unwrap().name, "ROOT");
        assert!(hive.get_key("Software\\Nope").is_none());
    }

    #[test]
    fn deleted_keys_need_recovery() {
        let hive = hive();
        assert!(hive.get_key("System\\Removed").is_none());
        let hive = hive.with_recovery(true);
        assert!(hive.get_key("System\\Removed").is_some());
    }

    #[test]
    fn key_name_search_walks_pre_order() {
        let hive = hive();
        let hits = hive.find_in_key_name("s", false).unwrap();
        assert_eq!(paths(&hits), vec!["ROOT\\Software", "ROOT\\System"]);
    }

    #[test]
    fn key_name_regex_is_case_insensitive() {
        let hive = hive();
        let hits = hive.find_in_key_name("^VEND", true).unwrap();
        assert_eq!(paths(&hits), vec!["ROOT\\Software\\Vendor"]);
    }

    #[test]
    fn bad_regex_is_a_store_error() {
        let hive = hive();
        let err = hive.find_in_value_name("(", true).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPattern { .. }));
    }

    #[test]
    fn value_name_search_hides_deleted_values() {
        let hive = hive();
        assert!(hive.find_in_value_name("gone", false).unwrap().is_empty());
        let hive = hive.with_recovery(true);
        assert_eq!(
            paths(&hive.find_in_value_name("gone", false).unwrap()),
            vec!["ROOT\\System:Gone"]
        );
    }

    #[test]
    fn size_threshold_is_inclusive() {
        let hive = hive();
        // Version is 8 bytes of UTF-16, Blob exactly 5, Start only 4.
        let hits = hive.find_by_value_size(5).unwrap();
        assert_eq!(
            paths(&hits),
            vec!["ROOT\\Software\\Vendor:Version", "ROOT\\Software\\Vendor:Blob"]
        );
    }

    #[test]
    fn last_write_range_skips_keys_without_timestamp() {
        let hive = hive();
        let range =
            TimeRange::new(Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()), None).unwrap();
        let hits = hive.find_by_last_write_time(&range).unwrap();
        assert_eq!(
            paths(&hits),
            vec!["ROOT\\Software\\Vendor", "ROOT\\System"]
        );
    }

    #[test]
    fn data_search_matches_text_and_encoded_bytes() {
        let hive = hive();
        // "1.0" matches the decoded string, "hello" matches the hex of the blob.
        let hits = hive
            .find_in_value_data(&DataPattern::new("1.0", false, false))
            .unwrap();
        assert_eq!(paths(&hits), vec!["ROOT\\Software\\Vendor:Version"]);

        let hits = hive
            .find_in_value_data(&DataPattern::new("hello", false, false))
            .unwrap();
        assert_eq!(paths(&hits), vec!["ROOT\\Software\\Vendor:Blob"]);
    }

    #[test]
    fn literal_data_search_skips_encoded_bytes() {
        let hive = hive();
        let hits = hive
            .find_in_value_data(&DataPattern::new("hello", false, true))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn slack_search_finds_utf16_remnants() {
        let hive = hive();
        let hits = hive
            .find_in_value_data_slack(&DataPattern::new("secret", false, false))
            .unwrap();
        assert_eq!(paths(&hits), vec!["ROOT\\Software\\Vendor:Blob"]);
    }

    #[test]
    fn data_search_finds_ascii_inside_string_values() {
        let mut root = Key::root("ROOT");
        root.values
            .push(Value::new("Payload", ValueType::Sz, b"evil.exe\0".to_vec()));
        root.values
            .push(Value::new("Clean", ValueType::Sz, utf16("notepad.exe\0")));
        let hive = MemoryHive::new(root);

        let hits = hive
            .find_in_value_data(&DataPattern::new("EVIL", false, false))
            .unwrap();
        assert_eq!(paths(&hits), vec!["ROOT:Payload"]);

        let hits = hive
            .find_in_value_data(&DataPattern::new("evil", false, true))
            .unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn data_search_finds_bytes_inside_integers() {
        let mut root = Key::root("ROOT");
        // Little-endian 0x41424344 is the bytes "DCBA"; it renders as 1094861636.
        root.values.push(Value::new(
            "Flags",
            ValueType::Dword,
            0x4142_4344u32.to_le_bytes().to_vec(),
        ));
        let hive = MemoryHive::new(root);

        let hits = hive
            .find_in_value_data(&DataPattern::new("cb", false, false))
            .unwrap();
        assert_eq!(paths(&hits), vec!["ROOT:Flags"]);
        assert!(hive
            .find_in_value_data(&DataPattern::new("zz", false, false))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn byte_search_ignores_ascii_case_only() {
        assert!(contains_bytes(b"xxEvilxx", b"eVIL"));
        assert!(!contains_bytes(b"ev", b"evil"));
        assert!(contains_bytes(b"", b""));
    }

    #[test]
    fn data_regex_runs_against_rendered_text() {
        let hive = hive();
        let hits = hive
            .find_in_value_data(&DataPattern::new(r"^\d$", true, false))
            .unwrap();
        assert_eq!(paths(&hits), vec!["ROOT\\System:Start"]);
    }
}
