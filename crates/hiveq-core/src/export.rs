//! Value export: writes a value's raw payload to disk.

use std::path::Path;

use tracing::info;

use crate::types::Value;

/// Write `value.data` verbatim to `path`, creating parent directories.
pub fn export_value(value: &Value, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &value.data)?;
    info!(
        value = %value.name,
        bytes = value.data.len(),
        path = %path.display(),
        "export: value saved"
    );
    Ok(())
}
