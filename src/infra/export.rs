use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::info;

use crate::domain::{ExportRecord, EXPORT_FILENAME};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode export: {0}")]
    Serde(#[from] serde_json::Error),
}

/// The user's download folder, or the working directory.
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Writes `freight_results.json` into `dir`, replacing any previous export.
pub fn write_export(record: &ExportRecord, dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(EXPORT_FILENAME);
    fs::write(&path, record.to_json()?)?;
    info!(path = %path.display(), freighters = record.freighters.len(), "exported plan");
    Ok(path)
}
