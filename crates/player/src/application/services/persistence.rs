//! Loading and saving the planner document
//!
//! Loading never fails: unreadable data becomes an empty document, and
//! partially broken data is pruned record by record. Either way the caller
//! gets a [`StorageNotice`] to show the user.

use std::fmt;

use idolplanner_domain::{
    detect_storage_version, migrate_storage, sanitize_storage, StorageDocument,
};
use serde_json::Value;

use crate::ports::outbound::{storage_keys, StorageError, StorageProvider};

/// Why the stored document was not loaded as it was
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageNotice {
    /// Nothing usable was stored; the planner starts empty
    Reset,
    /// Invalid records were dropped
    Repaired {
        dropped_sets: usize,
        dropped_inventory: usize,
        dropped_placements: usize,
        active_set_reset: bool,
    },
}

impl fmt::Display for StorageNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => write!(f, "Saved planner data could not be read and was reset"),
            Self::Repaired {
                dropped_sets,
                dropped_inventory,
                dropped_placements,
                ..
            } => write!(
                f,
                "Some saved planner data was invalid and was removed \
                 ({} set(s), {} idol(s), {} placement(s))",
                dropped_sets, dropped_inventory, dropped_placements
            ),
        }
    }
}

/// Read the planner document from `storage`.
///
/// Tries a whole-document migration first and falls back to record-level
/// sanitization. The active set falls back to the first set when the stored
/// one is gone.
pub fn load_storage<S: StorageProvider + ?Sized>(
    storage: &S,
) -> (StorageDocument, Option<StorageNotice>) {
    let Some(raw) = storage.load(storage_keys::PLANNER_DATA) else {
        tracing::debug!("No stored planner data");
        return (StorageDocument::empty(), None);
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "Stored planner data is not valid JSON");
            return (StorageDocument::empty(), Some(StorageNotice::Reset));
        }
    };

    let (mut document, notice) = match migrate_storage(&value) {
        Ok(document) => {
            tracing::debug!(
                version = ?detect_storage_version(&value),
                sets = document.sets().len(),
                "Loaded planner data"
            );
            (document, None)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Stored planner data failed migration, sanitizing");
            match sanitize_storage(&value) {
                Some(report) => {
                    tracing::info!(
                        source_version = report.source_version,
                        dropped_sets = report.dropped_sets,
                        dropped_inventory = report.dropped_inventory,
                        dropped_placements = report.dropped_placements,
                        active_set_reset = report.active_set_reset,
                        "Sanitized stored planner data"
                    );
                    let notice = (!report.is_clean()).then_some(StorageNotice::Repaired {
                        dropped_sets: report.dropped_sets,
                        dropped_inventory: report.dropped_inventory,
                        dropped_placements: report.dropped_placements,
                        active_set_reset: report.active_set_reset,
                    });
                    (report.document, notice)
                }
                None => {
                    tracing::warn!("Stored planner data has no usable sets, starting empty");
                    (StorageDocument::empty(), Some(StorageNotice::Reset))
                }
            }
        }
    };

    if document.ensure_active_set() {
        tracing::debug!(active_set_id = ?document.active_set_id(), "Active set fell back to the first set");
    }
    (document, notice)
}

/// Write the planner document to `storage`.
///
/// A document that fails validation is not written; this is logged and
/// reported as `Ok(false)`.
pub fn save_storage<S: StorageProvider + ?Sized>(
    storage: &S,
    document: &StorageDocument,
) -> Result<bool, StorageError> {
    if let Err(e) = document.validate() {
        tracing::error!(error = %e, "Refusing to save invalid planner data");
        return Ok(false);
    }
    let json = serde_json::to_string(document)?;
    storage.save(storage_keys::PLANNER_DATA, &json)?;
    tracing::debug!(sets = document.sets().len(), bytes = json.len(), "Saved planner data");
    Ok(true)
}
