//! Desktop platform implementations
//!
//! File-backed storage and the system clock.

use crate::ports::outbound::{ClockPort, StorageError, StorageProvider};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Name of the key/value file inside the data directory
pub const STORAGE_FILE_NAME: &str = "storage.json";

/// Platform config directory for planner data.
///
/// - Linux: ~/.config/idolplanner
/// - macOS: ~/Library/Application Support/com.poe-idol-planner.idolplanner
/// - Windows: C:\Users\<User>\AppData\Roaming\poe-idol-planner\idolplanner\config
///
/// Falls back to the current directory when no home directory is known.
pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "poe-idol-planner", "idolplanner")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Storage provider with file-based persistence
///
/// Keeps every key in one JSON object on disk and an in-memory copy that
/// serves reads. Each write rewrites the file.
#[derive(Clone)]
pub struct FileStorageProvider {
    /// Path to the storage file
    storage_path: PathBuf,
    /// In-memory cache of stored values
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl FileStorageProvider {
    /// Open the store in `data_dir`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file also starts
    /// empty (logged); it is overwritten on the next write.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let storage_path = data_dir.as_ref().join(STORAGE_FILE_NAME);

        let cache = if storage_path.exists() {
            match fs::read_to_string(&storage_path) {
                Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                    Ok(map) => map,
                    Err(e) => {
                        tracing::warn!(path = %storage_path.display(), error = %e, "Failed to parse storage file");
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %storage_path.display(), error = %e, "Failed to read storage file");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!(path = %storage_path.display(), keys = cache.len(), "File storage initialized");

        Self {
            storage_path,
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Persist the cache to disk
    fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let data = {
            let cache = self.cache.read().map_err(|_| StorageError::LockPoisoned)?;
            serde_json::to_string_pretty(&*cache)?
        };
        fs::write(&self.storage_path, data).inspect_err(|e| {
            tracing::error!(path = %self.storage_path.display(), error = %e, "Failed to write storage file");
        })?;
        Ok(())
    }
}

impl StorageProvider for FileStorageProvider {
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        {
            let mut guard = self.cache.write().map_err(|_| StorageError::LockPoisoned)?;
            guard.insert(key.to_string(), value.to_string());
        }
        self.persist()
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to acquire read lock for storage");
                None
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let removed = {
            let mut guard = self.cache.write().map_err(|_| StorageError::LockPoisoned)?;
            guard.remove(key).is_some()
        };
        if removed {
            self.persist()?;
        }
        Ok(())
    }
}

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
