//! On-device snapshot store, the durability floor.
//!
//! Keeps one JSON record per key in a data directory. Writes land in a temp
//! file that is renamed over the record, so an interrupted write never leaves
//! a truncated snapshot behind. The public `load`/`save` pair never fails past
//! this boundary; the `try_` variants expose the cause.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config;
use crate::error::{InventoryError, Result};
use crate::models::InventoryData;

/// Synchronous key-value store holding the last saved snapshot.
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Directory where the record is stored.
    pub data_dir: PathBuf,
    key: String,
}

impl LocalStore {
    /// Open a store under `data_dir` using `key` as the record name.
    ///
    /// If `data_dir` is `None`, uses the platform-appropriate default data
    /// directory. The directory is created lazily on first save.
    pub fn new(data_dir: Option<PathBuf>, key: &str) -> Result<Self> {
        let key = key.trim();
        if key.is_empty() || key.contains(&['/', '\\'][..]) {
            return Err(InventoryError::InvalidArgument(format!(
                "storage key {:?} is not a plain file name",
                key
            )));
        }
        Ok(Self {
            data_dir: data_dir.unwrap_or_else(config::default_data_dir),
            key: key.to_string(),
        })
    }

    /// Store in `data_dir` under the default versioned key.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        Self::new(Some(data_dir.as_ref().to_path_buf()), config::STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path of the JSON record.
    pub fn path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", self.key))
    }

    fn tmp_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json.tmp", self.key))
    }

    /// Read the stored snapshot.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet. A record that
    /// exists but cannot be parsed is a [`InventoryError::Storage`] error.
    pub fn try_load(&self) -> Result<Option<InventoryData>> {
        let path = self.path();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&contents).map(Some).map_err(|e| {
            InventoryError::Storage(format!(
                "record '{}' is corrupt: {}",
                path.file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown"),
                e
            ))
        })
    }

    /// Load the stored snapshot, or `None` if absent or unreadable.
    ///
    /// A corrupt record is left in place; the next successful save
    /// overwrites it.
    pub fn load(&self) -> Option<InventoryData> {
        match self.try_load() {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(path = %self.path().display(), error = %e, "failed to load local inventory");
                None
            }
        }
    }

    /// Write `data` as the stored snapshot.
    pub fn try_save(&self, data: &InventoryData) -> Result<()> {
        fs::create_dir_all(&self.data_dir)?;
        let bytes = serde_json::to_vec(data)?;
        let tmp = self.tmp_path();

        let result = (|| -> Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
            drop(file);
            fs::rename(&tmp, self.path())?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        result
    }

    /// Write `data`, reporting success as a boolean.
    pub fn save(&self, data: &InventoryData) -> bool {
        match self.try_save(data) {
            Ok(()) => {
                tracing::debug!(products = data.len(), "saved inventory locally");
                true
            }
            Err(e) => {
                tracing::error!(path = %self.path().display(), error = %e, "failed to save local inventory");
                false
            }
        }
    }

    /// Remove the stored record, if any.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
