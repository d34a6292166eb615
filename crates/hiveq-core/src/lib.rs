//! hiveq-core: query model and result pipeline for hiveq.
//!
//! This crate owns everything between parsed arguments and rendered output
//! except the terminal presentation itself.
//!
//! # Architecture
//!
//! ```text
//! QueryArgs ──► criteria (mode) ──► predicate ──► store ──► results
//!                                                  │           │
//!                                                  └─ export ◄─┘
//! ```
//!
//! Hive binary parsing lives outside this crate: loaders build a
//! [`MemoryHive`](memory::MemoryHive) and the pipeline only ever talks to it
//! through the [`HiveStore`](store::HiveStore) trait.

pub mod config;
pub mod criteria;
pub mod error;
pub mod export;
pub mod memory;
pub mod predicate;
pub mod results;
pub mod store;
pub mod types;

pub use criteria::{DataField, NameField, QueryArgs, SearchCriteria, TimeRange};
pub use error::{QueryError, Severity, StoreError};
pub use types::{Hit, Key, Value, ValueType};
