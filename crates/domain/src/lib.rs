//! Idol Planner domain
//!
//! Pure logic with no I/O: the idol model, the grid occupancy engine, idol
//! sets and their mutations, the persisted storage schemas with migration and
//! sanitization, clipboard text import, and the set content hash.

pub mod error;
pub mod grid;
pub mod idol;
pub mod ids;
pub mod import;
pub mod set;
pub mod storage;

pub use error::{DomainError, PlacementError};
pub use grid::{
    all_unlock_condition_ids, BlockedCells, GridPosition, GridTab, OccupancyGrid,
    PlacementRejection, UnlockCondition, GRID_HEIGHT, GRID_WIDTH, UNLOCK_CONDITIONS,
};
pub use idol::{
    IdolBase, IdolBaseType, IdolInstance, IdolModifier, ImplicitModifier, ModifierType, Rarity,
    IDOL_BASES,
};
pub use ids::{
    CraftingOptionId, IdolId, InventoryIdolId, ModifierId, PlacementId, ScarabId, SetId,
};
pub use import::{
    parse_idol_text, IdolParseError, ImportSummary, ModifierCatalog, ModifierDefinition,
};
pub use set::{
    compute_set_hash, IdolPlacement, IdolSet, IdolSource, InventoryIdol, MapDevice, SetName,
    SCARAB_SLOT_COUNT,
};
pub use storage::{
    detect_storage_version, migrate_storage, parse_and_migrate_storage, sanitize_storage,
    SanitizeReport, StorageDocument, STORAGE_VERSION,
};
