//! Idol model: static bases, modifiers and concrete idols

mod base;
mod instance;
mod modifier;

pub use base::{IdolBase, IdolBaseType, IDOL_BASES};
pub use instance::{
    IdolInstance, Rarity, MAX_ITEM_LEVEL, MAX_PREFIXES, MAX_SUFFIXES, MIN_ITEM_LEVEL,
};
pub use modifier::{IdolModifier, ImplicitModifier, ModifierType, MAX_TIER};
