use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::errors::CoreError;
use crate::models::snapshot::SymbolSnapshot;

use super::format;

/// High-level storage operations: save/load a snapshot to/from bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a snapshot to the JSON file layout.
    pub fn save_to_bytes(snapshot: &SymbolSnapshot) -> Result<Vec<u8>, CoreError> {
        format::encode(snapshot)
    }

    /// Parse a snapshot from the JSON file layout.
    pub fn load_from_bytes(data: &[u8]) -> Result<SymbolSnapshot, CoreError> {
        format::decode(data)
    }

    /// Replace the snapshot stored at `path`.
    ///
    /// Flow: validate → serialize → write `<path>.tmp` → rename over `path`.
    /// Readers see either the old file or the new one, never a partial write.
    pub async fn save_to_file(snapshot: &SymbolSnapshot, path: &Path) -> Result<(), CoreError> {
        snapshot.validate()?;
        let bytes = Self::save_to_bytes(snapshot)?;

        let temp = temp_path(path);
        fs::write(&temp, bytes).await?;
        if let Err(e) = fs::rename(&temp, path).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Load the snapshot stored at `path`.
    pub async fn load_from_file(path: &Path) -> Result<SymbolSnapshot, CoreError> {
        let bytes = fs::read(path)
            .await
            .map_err(|e| CoreError::FileIO(format!("{}: {e}", path.display())))?;
        Self::load_from_bytes(&bytes)
    }
}

/// Sibling of `path` with `.tmp` appended to the file name.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("symbols-data.json"));
    name.push(".tmp");
    path.with_file_name(name)
}
