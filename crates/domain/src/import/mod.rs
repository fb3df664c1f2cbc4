//! Clipboard import: pasted item text to idol instances

mod catalog;
mod parser;

pub use catalog::{normalize_modifier_text, ModifierCatalog, ModifierDefinition, MIN_SIMILARITY};
pub use parser::{
    detect_format, parse_idol, parse_idol_text, split_idol_blocks, ClipboardFormat,
    IdolParseError, ImportSummary,
};
