//! Parser for idol text copied from the game client.
//!
//! Two layouts are understood:
//!
//! - simple: sections separated by `--------`, implicit lines end with
//!   `(implicit)`
//! - advanced: each modifier is introduced by a header such as
//!   `{ Prefix Modifier "Legionnaire's" (Tier: 1) }`
//!
//! Several idols pasted together are split on their `Rarity:` lines, and each
//! one parses (or fails) on its own.

use regex_lite::Regex;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

use super::catalog::{strip_roll_ranges, ModifierCatalog};
use crate::error::DomainError;
use crate::idol::{IdolBaseType, IdolInstance, IdolModifier, ImplicitModifier, ModifierType, Rarity};

const SECTION_SEPARATOR: &str = "--------";
const IMPLICIT_SUFFIX: &str = "(implicit)";

static RARITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Rarity:\s*(\S+)").expect("valid regex"));
static ITEM_LEVEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Item Level:\s*(\S+)").expect("valid regex"));
static VALUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+-]?\d+(?:\.\d+)?").expect("valid regex"));
static MODIFIER_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\{\s*(Prefix|Suffix|Unique|Implicit)\s+Modifier(?:\s+"([^"]*)")?(?:\s*\(Tier:\s*(\d+)\))?[^}]*\}"#,
    )
    .expect("valid regex")
});
// Property lines that are never modifiers
static PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Item Class|Rarity|Item Level|Level|Quality|Stack Size|Requires|Requirements|Note)\b")
        .expect("valid regex")
});

/// Layout of pasted item text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardFormat {
    Simple,
    Advanced,
}

/// Why one pasted idol could not be imported
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdolParseError {
    #[error("No rarity line found")]
    MissingRarity,

    #[error("Unknown rarity: {0}")]
    UnknownRarity(String),

    #[error("Not an idol: no idol base type found")]
    MissingBaseType,

    #[error("No item level found")]
    MissingItemLevel,

    #[error("Invalid item level: {0}")]
    InvalidItemLevel(String),

    #[error("Unrecognised modifier: {text}")]
    UnknownModifier {
        text: String,
        /// Affix name from an advanced-format header, if there was one
        affix: Option<String>,
    },

    #[error("Invalid idol: {0}")]
    InvalidIdol(#[from] DomainError),
}

/// How many pasted idols parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub total: usize,
    pub failed: usize,
}

impl ImportSummary {
    pub fn from_results<T, E>(results: &[Result<T, E>]) -> Self {
        Self {
            total: results.len(),
            failed: results.iter().filter(|result| result.is_err()).count(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.total - self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failed == 0 {
            write!(f, "Imported {} idol(s)", self.total)
        } else {
            write!(
                f,
                "{} of {} idol(s) could not be parsed",
                self.failed, self.total
            )
        }
    }
}

pub fn detect_format(text: &str) -> ClipboardFormat {
    let advanced = text
        .lines()
        .any(|line| MODIFIER_HEADER_RE.is_match(line.trim()));
    if advanced {
        ClipboardFormat::Advanced
    } else {
        ClipboardFormat::Simple
    }
}

/// Split pasted text into one block per item. A block starts at a `Rarity:`
/// line; an `Item Class:` line right before it belongs to the same block.
pub fn split_idol_blocks(text: &str) -> Vec<String> {
    fn push_block(blocks: &mut Vec<String>, lines: &[&str]) {
        let block = lines.join("\n");
        let block = block.trim();
        if !block.is_empty() {
            blocks.push(block.to_string());
        }
    }

    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let starts_item = line.trim_start().starts_with("Rarity:");
        let has_rarity = current
            .iter()
            .any(|l| l.trim_start().starts_with("Rarity:"));
        if starts_item && has_rarity {
            let carried = match current.iter().rposition(|l| !l.trim().is_empty()) {
                Some(i) if current[i].trim_start().starts_with("Item Class:") => {
                    Some(current.remove(i))
                }
                _ => None,
            };
            push_block(&mut blocks, &current);
            current.clear();
            current.extend(carried);
        }
        current.push(line);
    }
    push_block(&mut blocks, &current);
    blocks
}

/// Parse every idol in pasted text; one result per block.
pub fn parse_idol_text(
    text: &str,
    catalog: &ModifierCatalog,
) -> Vec<Result<IdolInstance, IdolParseError>> {
    split_idol_blocks(text)
        .iter()
        .map(|block| parse_idol(block, catalog))
        .collect()
}

/// A modifier line with whatever its advanced-format header said about it
struct ModifierLine<'a> {
    text: &'a str,
    kind: Option<ModifierType>,
    implicit: bool,
    affix: Option<String>,
    tier: Option<u8>,
}

struct Header {
    kind: Option<ModifierType>,
    implicit: bool,
    affix: Option<String>,
    tier: Option<u8>,
}

fn parse_header(line: &str) -> Option<Header> {
    let captures = MODIFIER_HEADER_RE.captures(line)?;
    let (kind, implicit) = match captures.get(1).map(|m| m.as_str()) {
        Some("Prefix") => (Some(ModifierType::Prefix), false),
        Some("Suffix") => (Some(ModifierType::Suffix), false),
        Some("Unique") => (Some(ModifierType::Unique), false),
        _ => (None, true),
    };
    Some(Header {
        kind,
        implicit,
        affix: captures
            .get(2)
            .map(|m| m.as_str().to_string())
            .filter(|name| !name.is_empty()),
        tier: captures.get(3).and_then(|m| m.as_str().parse().ok()),
    })
}

/// First number in a line, ignoring roll ranges; 0 when there is none.
fn first_value(text: &str) -> f64 {
    VALUE_RE
        .find(&strip_roll_ranges(text))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Display text of a modifier line without the implicit marker or roll ranges.
fn clean_text(text: &str) -> String {
    let text = text.trim().trim_end_matches(IMPLICIT_SUFFIX).trim();
    strip_roll_ranges(text).trim().to_string()
}

/// Parse one pasted idol.
pub fn parse_idol(block: &str, catalog: &ModifierCatalog) -> Result<IdolInstance, IdolParseError> {
    let lines: Vec<&str> = block.lines().map(str::trim).collect();

    let (rarity_index, rarity_text) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| {
            RARITY_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| (i, m.as_str()))
        })
        .ok_or(IdolParseError::MissingRarity)?;
    let rarity: Rarity = rarity_text
        .parse()
        .map_err(|_| IdolParseError::UnknownRarity(rarity_text.to_string()))?;

    let after_rarity = &lines[rarity_index + 1..];
    let header_len = after_rarity
        .iter()
        .position(|line| *line == SECTION_SEPARATOR)
        .unwrap_or(after_rarity.len());
    let (name_lines, body) = after_rarity.split_at(header_len);
    let name_lines: Vec<&str> = name_lines
        .iter()
        .copied()
        .filter(|line| !line.is_empty())
        .collect();

    let (base_index, base_type) = name_lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| IdolBaseType::from_base_name(line).map(|base| (i, base)))
        .ok_or(IdolParseError::MissingBaseType)?;
    let name = match rarity {
        Rarity::Rare | Rarity::Unique if base_index > 0 => Some(name_lines[0].to_string()),
        _ => None,
    };

    let item_level_text = body
        .iter()
        .find_map(|line| {
            ITEM_LEVEL_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str())
        })
        .ok_or(IdolParseError::MissingItemLevel)?;
    let item_level: u8 = item_level_text
        .parse()
        .map_err(|_| IdolParseError::InvalidItemLevel(item_level_text.to_string()))?;

    let mut idol = IdolInstance::new(base_type, item_level, rarity);
    if let Some(name) = name {
        idol = idol.with_name(name);
    }

    for line in modifier_lines(body) {
        let text = clean_text(line.text);
        let value = first_value(line.text);

        if line.implicit {
            if idol.implicit.is_none() {
                idol = idol.with_implicit(ImplicitModifier { text, value });
            }
            continue;
        }

        match catalog.resolve(&text, line.kind) {
            Some(definition) => {
                idol = idol.with_modifier(IdolModifier {
                    mod_id: definition.id.clone(),
                    mod_type: line.kind.unwrap_or(definition.mod_type),
                    text,
                    value,
                    tier: line.tier,
                    mechanic: definition.mechanic.clone(),
                });
            }
            // Flavour and usage text carries no numbers
            None if !VALUE_RE.is_match(line.text) => {}
            None => {
                return Err(IdolParseError::UnknownModifier {
                    text,
                    affix: line.affix,
                })
            }
        }
    }

    idol.validate()?;
    Ok(idol)
}

/// Candidate modifier lines of the sections after the name header.
fn modifier_lines<'a>(body: &[&'a str]) -> Vec<ModifierLine<'a>> {
    let mut lines = Vec::new();
    let mut header: Option<Header> = None;
    for &line in body {
        if line.is_empty() || line == SECTION_SEPARATOR {
            header = None;
            continue;
        }
        if let Some(parsed) = parse_header(line) {
            header = Some(parsed);
            continue;
        }
        if PROPERTY_RE.is_match(line) {
            continue;
        }
        let marked_implicit = line.ends_with(IMPLICIT_SUFFIX);
        let current = header.as_ref();
        lines.push(ModifierLine {
            text: line,
            kind: current.and_then(|h| h.kind),
            implicit: marked_implicit || current.is_some_and(|h| h.implicit),
            affix: current.and_then(|h| h.affix.clone()),
            tier: current.and_then(|h| h.tier),
        });
    }
    lines
}
