use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::ExportFormat;

/// Write an export produced by the server into `dir` under its fixed file
/// name, replacing any previous export of the same format.
pub fn save_export(dir: &Path, format: ExportFormat, bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;
    let path = dir.join(format.filename());
    fs::write(&path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
