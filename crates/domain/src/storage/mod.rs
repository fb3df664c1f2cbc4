//! Persisted document, schema versions, migration and sanitization

mod document;
mod migrate;
mod sanitize;
mod schema;

pub use document::{StorageDocument, STORAGE_VERSION};
pub use migrate::{detect_storage_version, migrate_storage, parse_and_migrate_storage};
pub use sanitize::{sanitize_storage, SanitizeReport};
