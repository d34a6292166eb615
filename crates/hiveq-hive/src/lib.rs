//! hiveq-hive: hive loaders for hiveq.
//!
//! Each loader reads a hive file and produces the owned [`Key`] tree behind a
//! [`MemoryHive`]. The format is sniffed from the first four bytes: `regf`
//! files go through `nt-hive`, anything else is read as a JSON snapshot.

pub mod regf;
pub mod snapshot;

use std::path::{Path, PathBuf};

use hiveq_core::memory::MemoryHive;
use hiveq_core::Key;
use tracing::{debug, warn};

const REGF_SIGNATURE: &[u8; 4] = b"regf";

/// Failures while reading or decoding a hive file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed regf hive: {0}")]
    Regf(String),
    #[error("malformed hive snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("value {value:?}: {reason}")]
    InvalidValue { value: String, reason: String },
}

/// On-disk hive flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HiveFormat {
    Regf,
    Snapshot,
}

impl HiveFormat {
    pub fn detect(bytes: &[u8]) -> Self {
        if bytes.starts_with(REGF_SIGNATURE) {
            HiveFormat::Regf
        } else {
            HiveFormat::Snapshot
        }
    }
}

/// Read and parse the hive at `path`.
///
/// With `recover`, deleted keys and values the format carries are kept
/// visible to searches.
pub fn open(path: &Path, recover: bool) -> Result<MemoryHive, LoadError> {
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let format = HiveFormat::detect(&bytes);
    debug!(path = %path.display(), bytes = bytes.len(), ?format, "hive: loading");

    let root = parse(&bytes, format)?;
    if recover && format == HiveFormat::Regf {
        warn!("hive: regf reader exposes no deleted records; --recover has no effect");
    }
    debug!(root = %root.name, keys = count_keys(&root), "hive: loaded");
    Ok(MemoryHive::new(root).with_recovery(recover))
}

/// Parse hive bytes of a known format.
pub fn parse(bytes: &[u8], format: HiveFormat) -> Result<Key, LoadError> {
    match format {
        HiveFormat::Regf => regf::parse(bytes),
        HiveFormat::Snapshot => snapshot::parse(bytes),
    }
}

fn count_keys(key: &Key) -> usize {
    1 + key.subkeys.iter().map(count_keys).sum::<usize>()
}
