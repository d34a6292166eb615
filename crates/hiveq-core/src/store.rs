//! Store: the hive query contract and the executor that drives it.
//!
//! Loaders parse the hive; everything downstream sees only [`HiveStore`].
//! Hits come back in whatever order the store walks the tree.

use tracing::debug;

use crate::criteria::TimeRange;
use crate::error::StoreError;
use crate::predicate::{DataPattern, Predicate};
use crate::types::{Hit, Key};

/// A parsed hive that can be searched.
pub trait HiveStore {
    /// The hive's top-level key.
    fn root(&self) -> &Key;

    /// Look up a key by `\`-separated path, with or without the root name.
    fn get_key(&self, path: &str) -> Option<&Key>;

    /// Values whose raw payload is at least `min_bytes` long.
    fn find_by_value_size(&self, min_bytes: u64) -> Result<Vec<Hit<'_>>, StoreError>;

    /// Keys whose last-write time falls inside `range`.
    fn find_by_last_write_time(&self, range: &TimeRange) -> Result<Vec<Hit<'_>>, StoreError>;

    fn find_in_key_name(&self, term: &str, is_regex: bool) -> Result<Vec<Hit<'_>>, StoreError>;

    fn find_in_value_name(&self, term: &str, is_regex: bool) -> Result<Vec<Hit<'_>>, StoreError>;

    fn find_in_value_data(&self, pattern: &DataPattern) -> Result<Vec<Hit<'_>>, StoreError>;

    fn find_in_value_data_slack(&self, pattern: &DataPattern)
        -> Result<Vec<Hit<'_>>, StoreError>;
}

/// Run `predicate` against `store`.
pub fn execute<'s, S>(store: &'s S, predicate: &Predicate) -> Result<Vec<Hit<'s>>, StoreError>
where
    S: HiveStore + ?Sized,
{
    let hits = match predicate {
        Predicate::ValueSize { min_bytes } => store.find_by_value_size(*min_bytes)?,
        Predicate::LastWrite(range) => store.find_by_last_write_time(range)?,
        Predicate::KeyName(p) => store.find_in_key_name(&p.term, p.is_regex)?,
        Predicate::ValueName(p) => store.find_in_value_name(&p.term, p.is_regex)?,
        Predicate::ValueData(p) => store.find_in_value_data(p)?,
        Predicate::ValueSlack(p) => store.find_in_value_data_slack(p)?,
    };
    debug!(hits = hits.len(), "store: query executed");
    Ok(hits)
}
