//! Binary `regf` hives via the `nt-hive` crate.
//!
//! `nt-hive` walks the live key tree only: it exposes no last-write times,
//! no slack and no deleted cells, so those fields stay empty here.

use hiveq_core::{Key, Value, ValueType};
use nt_hive::{Hive, KeyNode, NtHiveError};
use tracing::{debug, warn};

use crate::LoadError;

type Node<'h, 'b> = KeyNode<&'h Hive<&'b [u8]>, &'b [u8]>;

/// Parse a complete `regf` file into an owned key tree.
pub fn parse(bytes: &[u8]) -> Result<Key, LoadError> {
    let hive = Hive::new(bytes).or_else(|err| {
        warn!(%err, "regf: header validation failed, reading without validation");
        Hive::without_validation(bytes)
    });
    let hive = hive.map_err(regf_error)?;
    let root = hive.root_key_node().map_err(regf_error)?;
    let name = root.name().map_err(regf_error)?.to_string();
    convert(&root, Key::root(name))
}

fn convert(node: &Node<'_, '_>, mut key: Key) -> Result<Key, LoadError> {
    if let Some(values) = node.values() {
        for value in values.map_err(regf_error)? {
            let value = value.map_err(regf_error)?;
            let name = value.name().map_err(regf_error)?.to_string();
            let value_type = match value.data_type() {
                Ok(ty) => ValueType::from_raw(ty as u32),
                Err(err) => {
                    debug!(key = %key.path, value = %name, %err, "regf: unsupported value type");
                    ValueType::Unknown(u32::MAX)
                }
            };
            let data = value
                .data()
                .and_then(|data| data.into_vec())
                .map_err(regf_error)?;
            key.values.push(Value::new(name, value_type, data));
        }
    }

    if let Some(subkeys) = node.subkeys() {
        for subkey in subkeys.map_err(regf_error)? {
            let subkey = subkey.map_err(regf_error)?;
            let name = subkey.name().map_err(regf_error)?.to_string();
            let child = convert(&subkey, Key::child(&key.path, name))?;
            key.subkeys.push(child);
        }
    }
    Ok(key)
}

fn regf_error(err: NtHiveError) -> LoadError {
    LoadError::Regf(err.to_string())
}
