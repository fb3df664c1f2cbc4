use serde::{Deserialize, Serialize};

use crate::grid::{GridPosition, GridTab};
use crate::ids::{InventoryIdolId, PlacementId};

/// An inventory idol anchored on one tab of the grid.
///
/// The covered footprint comes from the idol's base and is not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdolPlacement {
    pub id: PlacementId,
    pub inventory_idol_id: InventoryIdolId,
    pub position: GridPosition,
    pub tab: GridTab,
}

impl IdolPlacement {
    pub fn new(inventory_idol_id: InventoryIdolId, position: GridPosition, tab: GridTab) -> Self {
        Self {
            id: PlacementId::new(),
            inventory_idol_id,
            position,
            tab,
        }
    }
}
