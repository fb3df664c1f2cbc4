//! Idol sets: inventory, placements, map device and unlocked conditions

mod hash;
mod idol_set;
mod inventory;
mod map_device;
mod name;
mod placement;

pub use hash::compute_set_hash;
pub use idol_set::IdolSet;
pub(crate) use idol_set::partition_placements;
pub use inventory::{IdolSource, InventoryIdol};
pub use map_device::{MapDevice, SCARAB_SLOT_COUNT};
pub use name::SetName;
pub use placement::IdolPlacement;
