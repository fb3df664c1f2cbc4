//! Planner Service - active-set operations over the stored document
//!
//! Owns the loaded [`StorageDocument`] and writes it back through the
//! storage port after every successful mutation. Operations act on the
//! active set unless they name a set.

use chrono::{DateTime, Utc};
use idolplanner_domain::{
    CraftingOptionId, GridPosition, GridTab, IdolInstance, IdolSet, IdolSource, InventoryIdolId,
    PlacementId, ScarabId, SetId, SetName, StorageDocument,
};

use super::persistence::{load_storage, save_storage, StorageNotice};
use crate::application::error::PlannerError;
use crate::ports::outbound::{ClockPort, StorageProvider};

/// Name given to the set created when the planner has none
pub const DEFAULT_SET_NAME: &str = "My Idol Set";

pub struct PlannerService<S, C> {
    storage: S,
    clock: C,
    document: StorageDocument,
}

impl<S: StorageProvider, C: ClockPort> PlannerService<S, C> {
    /// Load the stored document. The notice, if any, tells the user that
    /// stored data was reset or repaired.
    pub fn load(storage: S, clock: C) -> (Self, Option<StorageNotice>) {
        let (document, notice) = load_storage(&storage);
        (
            Self {
                storage,
                clock,
                document,
            },
            notice,
        )
    }

    pub fn document(&self) -> &StorageDocument {
        &self.document
    }

    pub fn active_set(&self) -> Option<&IdolSet> {
        self.document.active_set()
    }

    /// Write the document. `Ok(false)` means it failed validation and was
    /// left unwritten.
    pub fn save(&self) -> Result<bool, PlannerError> {
        Ok(save_storage(&self.storage, &self.document)?)
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Run `change` on the active set, then save.
    fn with_active_set<T>(
        &mut self,
        change: impl FnOnce(&mut IdolSet, DateTime<Utc>) -> Result<T, PlannerError>,
    ) -> Result<T, PlannerError> {
        let now = self.now();
        let set = self
            .document
            .active_set_mut()
            .ok_or(PlannerError::NoActiveSet)?;
        let result = change(set, now)?;
        self.save()?;
        Ok(result)
    }

    // =========================================================================
    // Sets
    // =========================================================================

    /// The active set's id, creating a default set when there is none.
    pub fn ensure_active_set(&mut self) -> Result<SetId, PlannerError> {
        if let Some(set) = self.document.active_set() {
            return Ok(set.id().clone());
        }
        self.create_set(DEFAULT_SET_NAME)
    }

    pub fn create_set(&mut self, name: &str) -> Result<SetId, PlannerError> {
        let name = SetName::new(name)?;
        let now = self.now();
        let id = self.document.create_set(name, now);
        tracing::info!(set_id = %id, "Created idol set");
        self.save()?;
        Ok(id)
    }

    pub fn select_set(&mut self, id: &SetId) -> Result<(), PlannerError> {
        self.document.select_set(id)?;
        self.save()?;
        Ok(())
    }

    pub fn rename_active_set(&mut self, name: &str) -> Result<(), PlannerError> {
        let name = SetName::new(name)?;
        self.with_active_set(|set, now| {
            set.rename(name, now);
            Ok(())
        })
    }

    /// Copy the active set under `name` and activate the copy.
    pub fn duplicate_active_set(&mut self, name: &str) -> Result<SetId, PlannerError> {
        let name = SetName::new(name)?;
        let source = self
            .document
            .active_set_id()
            .cloned()
            .ok_or(PlannerError::NoActiveSet)?;
        let now = self.now();
        let id = self.document.duplicate_set(&source, name, now)?;
        tracing::info!(source_set_id = %source, set_id = %id, "Duplicated idol set");
        self.save()?;
        Ok(id)
    }

    pub fn delete_set(&mut self, id: &SetId) -> Result<bool, PlannerError> {
        let deleted = self.document.delete_set(id);
        if deleted {
            tracing::info!(set_id = %id, "Deleted idol set");
            self.save()?;
        }
        Ok(deleted)
    }

    // =========================================================================
    // Placements
    // =========================================================================

    pub fn try_place_idol(
        &mut self,
        inventory_idol_id: &InventoryIdolId,
        position: GridPosition,
        tab: GridTab,
    ) -> Result<PlacementId, PlannerError> {
        self.with_active_set(|set, now| {
            Ok(set.place_idol(inventory_idol_id, position, tab, now)?)
        })
    }

    /// Place an inventory idol on the active set; `None` when there is no
    /// active set or the placement is rejected.
    pub fn place_idol(
        &mut self,
        inventory_idol_id: &InventoryIdolId,
        position: GridPosition,
        tab: GridTab,
    ) -> Option<PlacementId> {
        match self.try_place_idol(inventory_idol_id, position, tab) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!(inventory_idol_id = %inventory_idol_id, %position, %tab, error = %e, "Placement rejected");
                None
            }
        }
    }

    /// Place an inventory idol at the first free position of `tab`.
    pub fn auto_place_idol(
        &mut self,
        inventory_idol_id: &InventoryIdolId,
        tab: GridTab,
    ) -> Result<PlacementId, PlannerError> {
        self.with_active_set(|set, now| Ok(set.auto_place_idol(inventory_idol_id, tab, now)?))
    }

    pub fn try_move_idol(
        &mut self,
        placement_id: &PlacementId,
        position: GridPosition,
        tab: GridTab,
    ) -> Result<(), PlannerError> {
        self.with_active_set(|set, now| Ok(set.move_idol(placement_id, position, tab, now)?))
    }

    /// Move a placement on the active set; `false` when there is no active
    /// set or the move is rejected.
    pub fn move_idol(
        &mut self,
        placement_id: &PlacementId,
        position: GridPosition,
        tab: GridTab,
    ) -> bool {
        match self.try_move_idol(placement_id, position, tab) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(placement_id = %placement_id, %position, %tab, error = %e, "Move rejected");
                false
            }
        }
    }

    pub fn remove_placement(&mut self, placement_id: &PlacementId) -> Result<bool, PlannerError> {
        self.with_active_set(|set, now| Ok(set.remove_placement(placement_id, now)))
    }

    pub fn clear_tab(&mut self, tab: GridTab) -> Result<usize, PlannerError> {
        self.with_active_set(|set, now| Ok(set.clear_tab(tab, now)))
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    /// Add idols to the active set's inventory, creating a set when needed.
    pub fn add_idols(
        &mut self,
        idols: Vec<IdolInstance>,
        source: IdolSource,
    ) -> Result<Vec<InventoryIdolId>, PlannerError> {
        self.ensure_active_set()?;
        self.with_active_set(|set, now| Ok(set.add_idols(idols, source, now)))
    }

    /// Remove an inventory idol and its placements from every set. Returns
    /// the number of sets that held it.
    pub fn remove_inventory_idol(&mut self, id: &InventoryIdolId) -> Result<usize, PlannerError> {
        let now = self.now();
        let changed = self.document.remove_inventory_idol_from_all_sets(id, now);
        if changed > 0 {
            tracing::info!(inventory_idol_id = %id, sets = changed, "Removed inventory idol");
            self.save()?;
        }
        Ok(changed)
    }

    // =========================================================================
    // Map device and unlocks
    // =========================================================================

    pub fn set_scarab(&mut self, slot: usize, scarab: Option<ScarabId>) -> Result<(), PlannerError> {
        self.with_active_set(|set, now| Ok(set.set_scarab(slot, scarab, now)?))
    }

    pub fn set_crafting_option(
        &mut self,
        option: Option<CraftingOptionId>,
    ) -> Result<(), PlannerError> {
        self.with_active_set(|set, now| {
            set.set_crafting_option(option, now);
            Ok(())
        })
    }

    /// Lock or unlock a condition on the active set. Returns how many
    /// placements locking removed.
    pub fn set_condition_unlocked(
        &mut self,
        condition_id: &str,
        unlocked: bool,
    ) -> Result<usize, PlannerError> {
        let removed = self.with_active_set(|set, now| {
            Ok(set.set_condition_unlocked(condition_id, unlocked, now)?)
        })?;
        if removed > 0 {
            tracing::info!(condition_id, removed, "Locking a condition removed placements");
        }
        Ok(removed)
    }

    /// Recompute and store the active set's content hash.
    pub fn refresh_content_hash(&mut self) -> Result<String, PlannerError> {
        self.with_active_set(|set, _| Ok(set.refresh_content_hash().to_string()))
    }

    /// Add a finished set and make it active.
    pub(crate) fn adopt_set(&mut self, set: IdolSet) -> Result<SetId, PlannerError> {
        set.validate()?;
        let id = self.document.add_set(set);
        self.save()?;
        Ok(id)
    }
}
