//! hiveq: query Windows registry hives from the command line.
//!
//! The binary is a thin shell around two modules so the integration tests can
//! drive a full run without spawning a process:
//!
//! - [`cli`] parses the (case-insensitive) command line.
//! - [`run`] loads the hive, selects the query mode and renders the answer.
//!
//! The query model lives in `hiveq-core`, hive loaders in `hiveq-hive` and
//! terminal presentation in `hiveq-term`.

pub mod cli;
pub mod run;
