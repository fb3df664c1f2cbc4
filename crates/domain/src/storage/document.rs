//! The persisted document: every idol set plus the active set id

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DomainError;
use crate::ids::{InventoryIdolId, SetId};
use crate::set::{IdolSet, SetName};

/// Schema version written by this crate
pub const STORAGE_VERSION: u64 = 4;

/// Wire shape of the current schema. Documents tagged with a newer version
/// are read with this shape too; writes always carry `STORAGE_VERSION`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CurrentStorage {
    pub version: u64,
    pub sets: Vec<IdolSet>,
    #[serde(default)]
    pub active_set_id: Option<SetId>,
}

impl TryFrom<CurrentStorage> for StorageDocument {
    type Error = DomainError;

    fn try_from(stored: CurrentStorage) -> Result<Self, Self::Error> {
        if stored.version < STORAGE_VERSION {
            return Err(DomainError::parse(format!(
                "Storage version {} is older than the current schema ({})",
                stored.version, STORAGE_VERSION
            )));
        }
        Ok(Self {
            sets: stored.sets,
            active_set_id: stored.active_set_id,
        })
    }
}

impl From<StorageDocument> for CurrentStorage {
    fn from(document: StorageDocument) -> Self {
        Self {
            version: STORAGE_VERSION,
            sets: document.sets,
            active_set_id: document.active_set_id,
        }
    }
}

/// All idol sets of a user, serialised as `{ version: 4, sets, activeSetId }`.
///
/// `active_set_id`, when present, names one of `sets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CurrentStorage", into = "CurrentStorage")]
pub struct StorageDocument {
    sets: Vec<IdolSet>,
    active_set_id: Option<SetId>,
}

impl StorageDocument {
    pub fn new(sets: Vec<IdolSet>, active_set_id: Option<SetId>) -> Self {
        Self {
            sets,
            active_set_id,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn sets(&self) -> &[IdolSet] {
        &self.sets
    }

    pub fn active_set_id(&self) -> Option<&SetId> {
        self.active_set_id.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn find_set(&self, id: &SetId) -> Option<&IdolSet> {
        self.sets.iter().find(|set| set.id() == id)
    }

    pub fn find_set_mut(&mut self, id: &SetId) -> Option<&mut IdolSet> {
        self.sets.iter_mut().find(|set| set.id() == id)
    }

    pub fn active_set(&self) -> Option<&IdolSet> {
        self.active_set_id.as_ref().and_then(|id| self.find_set(id))
    }

    pub fn active_set_mut(&mut self) -> Option<&mut IdolSet> {
        let id = self.active_set_id.clone()?;
        self.find_set_mut(&id)
    }

    /// Create an empty set and make it active.
    pub fn create_set(&mut self, name: SetName, now: DateTime<Utc>) -> SetId {
        self.add_set(IdolSet::new(name, now))
    }

    /// Append a set and make it active.
    pub fn add_set(&mut self, set: IdolSet) -> SetId {
        let id = set.id().clone();
        self.sets.push(set);
        self.active_set_id = Some(id.clone());
        id
    }

    /// Copy a set under a new name and make the copy active.
    pub fn duplicate_set(
        &mut self,
        id: &SetId,
        name: SetName,
        now: DateTime<Utc>,
    ) -> Result<SetId, DomainError> {
        let copy = self
            .find_set(id)
            .map(|set| set.duplicate(name, now))
            .ok_or_else(|| DomainError::not_found("IdolSet", id.as_str()))?;
        Ok(self.add_set(copy))
    }

    pub fn select_set(&mut self, id: &SetId) -> Result<(), DomainError> {
        if self.find_set(id).is_none() {
            return Err(DomainError::not_found("IdolSet", id.as_str()));
        }
        self.active_set_id = Some(id.clone());
        Ok(())
    }

    /// Delete a set. Deleting the active set activates the first remaining one.
    pub fn delete_set(&mut self, id: &SetId) -> bool {
        let before = self.sets.len();
        self.sets.retain(|set| set.id() != id);
        if self.sets.len() == before {
            return false;
        }
        if self.active_set_id.as_ref() == Some(id) {
            self.active_set_id = None;
            self.ensure_active_set();
        }
        true
    }

    /// Point `active_set_id` at the first set when it is unset or dangling.
    /// Returns true when the active set changed.
    pub fn ensure_active_set(&mut self) -> bool {
        if self.active_set().is_some() {
            return false;
        }
        let fallback = self.sets.first().map(|set| set.id().clone());
        let changed = fallback != self.active_set_id;
        self.active_set_id = fallback;
        changed
    }

    /// Remove an inventory idol (and its placements) from every set that
    /// holds it. Returns the number of sets changed.
    pub fn remove_inventory_idol_from_all_sets(
        &mut self,
        id: &InventoryIdolId,
        now: DateTime<Utc>,
    ) -> usize {
        self.sets
            .iter_mut()
            .map(|set| set.remove_inventory_idol(id, now))
            .filter(|removed| *removed)
            .count()
    }

    /// Check every rule a document must satisfy before it is written.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut ids = HashSet::new();
        for set in &self.sets {
            if !ids.insert(set.id()) {
                return Err(DomainError::constraint(format!(
                    "Duplicate set id {}",
                    set.id()
                )));
            }
            set.validate()?;
        }
        if let Some(active) = &self.active_set_id {
            if !ids.contains(active) {
                return Err(DomainError::constraint(format!(
                    "Active set {} does not exist",
                    active
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridPosition, GridTab};
    use crate::idol::{IdolBaseType, IdolInstance, Rarity};
    use crate::set::IdolSource;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap()
    }

    fn name(value: &str) -> SetName {
        SetName::new(value).unwrap()
    }

    #[test]
    fn serialises_with_current_version() {
        let mut document = StorageDocument::empty();
        let id = document.create_set(name("Main"), now());
        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["version"], json!(4));
        assert_eq!(value["activeSetId"], json!(id.as_str()));
        assert_eq!(value["sets"][0]["unlockedConditions"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn empty_document_serialises_null_active_id() {
        let value = serde_json::to_value(StorageDocument::empty()).unwrap();
        assert_eq!(value, json!({ "version": 4, "sets": [], "activeSetId": null }));
    }

    #[test]
    fn older_version_rejected_by_current_shape() {
        let value = json!({ "version": 3, "sets": [], "activeSetId": null });
        assert!(serde_json::from_value::<StorageDocument>(value).is_err());
    }

    #[test]
    fn newer_version_read_and_rewritten_as_current() {
        let value = json!({ "version": 5, "sets": [], "activeSetId": null });
        let document: StorageDocument = serde_json::from_value(value).unwrap();
        assert_eq!(serde_json::to_value(&document).unwrap()["version"], json!(4));
    }

    #[test]
    fn deleting_active_set_falls_back_to_first() {
        let mut document = StorageDocument::empty();
        let first = document.create_set(name("One"), now());
        let second = document.create_set(name("Two"), now());
        assert_eq!(document.active_set_id(), Some(&second));

        assert!(document.delete_set(&second));
        assert_eq!(document.active_set_id(), Some(&first));
        assert!(document.delete_set(&first));
        assert_eq!(document.active_set_id(), None);
        assert!(!document.delete_set(&first));
    }

    #[test]
    fn select_unknown_set_fails() {
        let mut document = StorageDocument::empty();
        assert!(document.select_set(&SetId::new()).is_err());
    }

    #[test]
    fn dangling_active_id_fails_validation() {
        let document = StorageDocument::new(Vec::new(), Some(SetId::new()));
        assert!(document.validate().is_err());
    }

    #[test]
    fn inventory_removal_reaches_duplicated_sets() {
        let mut document = StorageDocument::empty();
        let original = document.create_set(name("Original"), now());
        let set = document.find_set_mut(&original).unwrap();
        let ids = set.add_idols(
            vec![IdolInstance::new(IdolBaseType::Kamasan, 70, Rarity::Magic)],
            IdolSource::Clipboard,
            now(),
        );
        set.place_idol(&ids[0], GridPosition::new(1, 1), GridTab::Tab1, now())
            .unwrap();
        document
            .duplicate_set(&original, name("Copy"), now())
            .unwrap();

        assert_eq!(document.remove_inventory_idol_from_all_sets(&ids[0], now()), 2);
        for set in document.sets() {
            assert!(set.inventory().is_empty());
            assert!(set.placements().is_empty());
        }
        assert!(document.validate().is_ok());
    }
}
