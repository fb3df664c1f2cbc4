//! Platform abstraction ports
//!
//! Application services only see these traits, so the planner runs the same
//! against the file-backed store, the in-memory store, or a mock.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure of a storage adapter
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage data could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// Persistent key/value storage (file-based or in-memory)
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Wall clock
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Storage key constants
///
/// Kept in the ports layer as they define which keys the application uses.
pub mod storage_keys {
    /// The whole planner document (sets plus active set id)
    pub const PLANNER_DATA: &str = "poe-idol-planner-data";
}
