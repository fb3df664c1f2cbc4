//! Idol set aggregate - a saved layout with its own inventory and loadout
//!
//! # Invariants
//!
//! - Every placement references an inventory entry of the same set
//! - On each tab, placement footprints are inside the grid, disjoint, and
//!   avoid blocked cells (invalid cells and cells of locked conditions)
//! - Inventory and placement ids are unique within the set
//!
//! Mutations keep these invariants: a rejected place or move leaves the set
//! untouched, and removing an inventory entry removes its placements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{IdolPlacement, IdolSource, InventoryIdol, MapDevice, SetName};
use crate::error::{DomainError, PlacementError};
use crate::grid::{
    all_unlock_condition_ids, find_unlock_condition, footprint, BlockedCells, GridPosition,
    GridTab, OccupancyGrid, PlacementRejection,
};
use crate::idol::IdolInstance;
use crate::ids::{CraftingOptionId, InventoryIdolId, PlacementId, ScarabId, SetId};

/// Why a stored placement cannot be kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlacementDefect {
    DuplicateId,
    MissingInventoryIdol,
    Rejected(PlacementRejection),
}

impl std::fmt::Display for PlacementDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId => write!(f, "duplicate placement id"),
            Self::MissingInventoryIdol => write!(f, "references a missing inventory idol"),
            Self::Rejected(rejection) => write!(f, "{}", rejection),
        }
    }
}

/// Keep placements in stored order while they satisfy the grid rules; a later
/// placement that collides with an earlier one is the one dropped.
pub(crate) fn partition_placements(
    placements: Vec<IdolPlacement>,
    inventory: &[InventoryIdol],
    blocked: &BlockedCells,
) -> (Vec<IdolPlacement>, Vec<(IdolPlacement, PlacementDefect)>) {
    let mut grids = [
        OccupancyGrid::empty(),
        OccupancyGrid::empty(),
        OccupancyGrid::empty(),
    ];
    let mut seen_ids = HashSet::new();
    let mut kept = Vec::with_capacity(placements.len());
    let mut dropped = Vec::new();

    for placement in placements {
        if !seen_ids.insert(placement.id.clone()) {
            dropped.push((placement, PlacementDefect::DuplicateId));
            continue;
        }
        let Some(entry) = inventory
            .iter()
            .find(|entry| entry.id == placement.inventory_idol_id)
        else {
            dropped.push((placement, PlacementDefect::MissingInventoryIdol));
            continue;
        };
        let grid = &mut grids[usize::from(placement.tab.number() - 1)];
        match grid.check_placement(entry.idol.base_type, placement.position, blocked) {
            Ok(()) => {
                grid.occupy(entry.idol.base_type, placement.position);
                kept.push(placement);
            }
            Err(rejection) => dropped.push((placement, PlacementDefect::Rejected(rejection))),
        }
    }

    (kept, dropped)
}

/// A user's saved configuration: inventory, placements, map device and unlocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdolSet {
    id: SetId,
    name: SetName,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
    placements: Vec<IdolPlacement>,
    inventory: Vec<InventoryIdol>,
    map_device: MapDevice,
    unlocked_conditions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_hash: Option<String>,
}

impl IdolSet {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// An empty set with every condition unlocked.
    pub fn new(name: SetName, now: DateTime<Utc>) -> Self {
        Self {
            id: SetId::new(),
            name,
            created_at: now,
            updated_at: now,
            placements: Vec::new(),
            inventory: Vec::new(),
            map_device: MapDevice::default(),
            unlocked_conditions: all_unlock_condition_ids(),
            content_hash: None,
        }
    }

    /// Reconstruct from stored data
    pub fn from_parts(
        id: SetId,
        name: SetName,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        placements: Vec<IdolPlacement>,
        inventory: Vec<InventoryIdol>,
        map_device: MapDevice,
        unlocked_conditions: Vec<String>,
        content_hash: Option<String>,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            updated_at,
            placements,
            inventory,
            map_device,
            unlocked_conditions,
            content_hash,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> &SetId {
        &self.id
    }

    pub fn name(&self) -> &SetName {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn placements(&self) -> &[IdolPlacement] {
        &self.placements
    }

    pub fn inventory(&self) -> &[InventoryIdol] {
        &self.inventory
    }

    pub fn map_device(&self) -> &MapDevice {
        &self.map_device
    }

    pub fn unlocked_conditions(&self) -> &[String] {
        &self.unlocked_conditions
    }

    /// Cached content hash, if one was computed since the last change.
    pub fn content_hash(&self) -> Option<&str> {
        self.content_hash.as_deref()
    }

    pub fn find_inventory_idol(&self, id: &InventoryIdolId) -> Option<&InventoryIdol> {
        self.inventory.iter().find(|entry| &entry.id == id)
    }

    pub fn find_placement(&self, id: &PlacementId) -> Option<&IdolPlacement> {
        self.placements.iter().find(|placement| &placement.id == id)
    }

    /// Number of placements referencing an inventory entry.
    pub fn usage_count(&self, id: &InventoryIdolId) -> usize {
        self.placements
            .iter()
            .filter(|placement| &placement.inventory_idol_id == id)
            .count()
    }

    /// Inventory entries not placed on any tab.
    pub fn unplaced_inventory(&self) -> impl Iterator<Item = &InventoryIdol> {
        self.inventory
            .iter()
            .filter(|entry| self.usage_count(&entry.id) == 0)
    }

    pub fn placements_on(&self, tab: GridTab) -> impl Iterator<Item = &IdolPlacement> {
        self.placements
            .iter()
            .filter(move |placement| placement.tab == tab)
    }

    // =========================================================================
    // Grid queries
    // =========================================================================

    pub fn blocked_cells(&self) -> BlockedCells {
        BlockedCells::for_unlocked(&self.unlocked_conditions)
    }

    /// Fresh occupancy grid for a tab.
    pub fn occupancy(&self, tab: GridTab, exclude: Option<&PlacementId>) -> OccupancyGrid {
        OccupancyGrid::build(&self.placements, &self.inventory, tab, exclude)
    }

    /// Whether an inventory idol could be anchored at `position` on `tab`.
    pub fn check_placement(
        &self,
        inventory_idol_id: &InventoryIdolId,
        position: GridPosition,
        tab: GridTab,
        exclude: Option<&PlacementId>,
    ) -> Result<(), PlacementError> {
        let entry = self
            .find_inventory_idol(inventory_idol_id)
            .ok_or_else(|| PlacementError::UnknownInventoryIdol(inventory_idol_id.to_string()))?;
        self.occupancy(tab, exclude)
            .check_placement(entry.idol.base_type, position, &self.blocked_cells())?;
        Ok(())
    }

    // =========================================================================
    // Placement mutations
    // =========================================================================

    /// Place an inventory idol. Nothing changes when the placement is rejected.
    pub fn place_idol(
        &mut self,
        inventory_idol_id: &InventoryIdolId,
        position: GridPosition,
        tab: GridTab,
        now: DateTime<Utc>,
    ) -> Result<PlacementId, PlacementError> {
        self.check_placement(inventory_idol_id, position, tab, None)?;
        let placement = IdolPlacement::new(inventory_idol_id.clone(), position, tab);
        let id = placement.id.clone();
        self.placements.push(placement);
        self.touch(now);
        Ok(id)
    }

    /// Place an inventory idol at the first free anchor of `tab`.
    pub fn auto_place_idol(
        &mut self,
        inventory_idol_id: &InventoryIdolId,
        tab: GridTab,
        now: DateTime<Utc>,
    ) -> Result<PlacementId, PlacementError> {
        let entry = self
            .find_inventory_idol(inventory_idol_id)
            .ok_or_else(|| PlacementError::UnknownInventoryIdol(inventory_idol_id.to_string()))?;
        let position = self
            .occupancy(tab, None)
            .find_free_position(entry.idol.base_type, &self.blocked_cells())
            .ok_or(PlacementError::NoFreePosition(tab))?;
        self.place_idol(inventory_idol_id, position, tab, now)
    }

    /// Move a placement to a new anchor and/or tab. The placement does not
    /// collide with its own current footprint.
    pub fn move_idol(
        &mut self,
        placement_id: &PlacementId,
        position: GridPosition,
        tab: GridTab,
        now: DateTime<Utc>,
    ) -> Result<(), PlacementError> {
        let inventory_idol_id = self
            .find_placement(placement_id)
            .map(|placement| placement.inventory_idol_id.clone())
            .ok_or_else(|| PlacementError::UnknownPlacement(placement_id.to_string()))?;
        self.check_placement(&inventory_idol_id, position, tab, Some(placement_id))?;

        if let Some(placement) = self
            .placements
            .iter_mut()
            .find(|placement| &placement.id == placement_id)
        {
            placement.position = position;
            placement.tab = tab;
        }
        self.touch(now);
        Ok(())
    }

    /// Remove one placement; the inventory entry stays.
    pub fn remove_placement(&mut self, placement_id: &PlacementId, now: DateTime<Utc>) -> bool {
        let before = self.placements.len();
        self.placements
            .retain(|placement| &placement.id != placement_id);
        let removed = self.placements.len() != before;
        if removed {
            self.touch(now);
        }
        removed
    }

    /// Remove every placement on a tab, returning how many were removed.
    pub fn clear_tab(&mut self, tab: GridTab, now: DateTime<Utc>) -> usize {
        let before = self.placements.len();
        self.placements.retain(|placement| placement.tab != tab);
        let removed = before - self.placements.len();
        if removed > 0 {
            self.touch(now);
        }
        removed
    }

    // =========================================================================
    // Inventory mutations
    // =========================================================================

    /// Wrap idols as inventory entries and append them.
    pub fn add_idols(
        &mut self,
        idols: Vec<IdolInstance>,
        source: IdolSource,
        now: DateTime<Utc>,
    ) -> Vec<InventoryIdolId> {
        let entries: Vec<InventoryIdol> = idols
            .into_iter()
            .map(|idol| InventoryIdol::new(idol, source, now))
            .collect();
        let ids = entries.iter().map(|entry| entry.id.clone()).collect();
        self.add_inventory_entries(entries, now);
        ids
    }

    /// Append existing entries, skipping any whose id is already present.
    pub fn add_inventory_entries(&mut self, entries: Vec<InventoryIdol>, now: DateTime<Utc>) {
        let mut added = false;
        for entry in entries {
            if self.find_inventory_idol(&entry.id).is_none() {
                self.inventory.push(entry);
                added = true;
            }
        }
        if added {
            self.touch(now);
        }
    }

    /// Remove an inventory entry and every placement that references it.
    pub fn remove_inventory_idol(&mut self, id: &InventoryIdolId, now: DateTime<Utc>) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|entry| &entry.id != id);
        if self.inventory.len() == before {
            return false;
        }
        self.placements
            .retain(|placement| &placement.inventory_idol_id != id);
        self.touch(now);
        true
    }

    // =========================================================================
    // Map device and unlocks
    // =========================================================================

    pub fn set_scarab(
        &mut self,
        slot: usize,
        scarab: Option<ScarabId>,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.map_device.set_slot(slot, scarab)?;
        self.touch(now);
        Ok(())
    }

    pub fn set_crafting_option(&mut self, option: Option<CraftingOptionId>, now: DateTime<Utc>) {
        self.map_device.crafting_option_id = option;
        self.touch(now);
    }

    /// Lock or unlock a condition. Locking removes placements that cover the
    /// cells it gates; the number of removed placements is returned.
    pub fn set_condition_unlocked(
        &mut self,
        condition_id: &str,
        unlocked: bool,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let condition = find_unlock_condition(condition_id)
            .ok_or_else(|| DomainError::not_found("UnlockCondition", condition_id))?;

        let is_unlocked = self
            .unlocked_conditions
            .iter()
            .any(|id| id == condition.id);
        if is_unlocked == unlocked {
            return Ok(0);
        }

        let mut removed = 0;
        if unlocked {
            self.unlocked_conditions.push(condition.id.to_string());
        } else {
            self.unlocked_conditions.retain(|id| id != condition.id);
            let before = self.placements.len();
            let inventory = &self.inventory;
            self.placements.retain(|placement| {
                let Some(entry) = inventory
                    .iter()
                    .find(|entry| entry.id == placement.inventory_idol_id)
                else {
                    return true;
                };
                !footprint(entry.idol.base_type, placement.position)
                    .any(|cell| condition.cells.contains(&cell))
            });
            removed = before - self.placements.len();
        }
        self.touch(now);
        Ok(removed)
    }

    // =========================================================================
    // Set-level changes
    // =========================================================================

    pub fn rename(&mut self, name: SetName, now: DateTime<Utc>) {
        self.name = name;
        self.touch(now);
    }

    /// Copy under a new id and name. Inventory ids are kept so that
    /// cross-set removal by id reaches the copy too; placements get new ids.
    pub fn duplicate(&self, name: SetName, now: DateTime<Utc>) -> Self {
        let placements = self
            .placements
            .iter()
            .map(|placement| {
                IdolPlacement::new(
                    placement.inventory_idol_id.clone(),
                    placement.position,
                    placement.tab,
                )
            })
            .collect();
        Self {
            id: SetId::new(),
            name,
            created_at: now,
            updated_at: now,
            placements,
            inventory: self.inventory.clone(),
            map_device: self.map_device.clone(),
            unlocked_conditions: self.unlocked_conditions.clone(),
            content_hash: self.content_hash.clone(),
        }
    }

    /// Recompute and cache the content hash.
    pub fn refresh_content_hash(&mut self) -> &str {
        let hash = super::compute_set_hash(self);
        self.content_hash.insert(hash).as_str()
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
        self.content_hash = None;
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Check every record-level and referential rule of a persisted set.
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut inventory_ids = HashSet::new();
        for entry in &self.inventory {
            if !inventory_ids.insert(&entry.id) {
                return Err(DomainError::constraint(format!(
                    "Duplicate inventory idol id {} in set {}",
                    entry.id, self.id
                )));
            }
            entry.validate()?;
        }

        let (_, dropped) = partition_placements(
            self.placements.clone(),
            &self.inventory,
            &self.blocked_cells(),
        );
        if let Some((placement, defect)) = dropped.first() {
            return Err(DomainError::constraint(format!(
                "Placement {} in set {}: {}",
                placement.id, self.id, defect
            )));
        }
        Ok(())
    }

    /// Drop every placement that breaks the grid rules, returning how many
    /// were dropped.
    pub(crate) fn prune_placements(&mut self) -> usize {
        let placements = std::mem::take(&mut self.placements);
        let (kept, dropped) =
            partition_placements(placements, &self.inventory, &self.blocked_cells());
        self.placements = kept;
        dropped.len()
    }
}
