//! Grid occupancy engine
//!
//! A 6x7 grid per tab. Placements are checked against bounds, blocked cells
//! and the cells already covered by other placements on the same tab.

mod layout;
mod occupancy;

pub use layout::{
    all_unlock_condition_ids, find_unlock_condition, BlockedCells, GridPosition, GridTab,
    UnlockCondition, GRID_HEIGHT, GRID_WIDTH, INVALID_CELLS, UNLOCK_CONDITIONS,
};
pub use occupancy::{footprint, OccupancyGrid, PlacementRejection};
