//! Idol instance - a concrete idol with its rolled modifiers

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{IdolBaseType, IdolModifier, ImplicitModifier, ModifierType};
use crate::error::DomainError;
use crate::ids::IdolId;

/// Prefix slots available on an idol
pub const MAX_PREFIXES: usize = 2;

/// Suffix slots available on an idol
pub const MAX_SUFFIXES: usize = 2;

pub const MIN_ITEM_LEVEL: u8 = 1;
pub const MAX_ITEM_LEVEL: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Magic => write!(f, "Magic"),
            Self::Rare => write!(f, "Rare"),
            Self::Unique => write!(f, "Unique"),
        }
    }
}

impl std::str::FromStr for Rarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "magic" => Ok(Self::Magic),
            "rare" => Ok(Self::Rare),
            "unique" => Ok(Self::Unique),
            other => Err(DomainError::parse(format!("Unknown rarity: {}", other))),
        }
    }
}

/// A concrete idol.
///
/// Unique-tagged modifiers are kept in `prefixes` and do not use affix slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdolInstance {
    pub id: IdolId,
    pub base_type: IdolBaseType,
    pub item_level: u8,
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<ImplicitModifier>,
    #[serde(default)]
    pub prefixes: Vec<IdolModifier>,
    #[serde(default)]
    pub suffixes: Vec<IdolModifier>,
}

impl IdolInstance {
    pub fn new(base_type: IdolBaseType, item_level: u8, rarity: Rarity) -> Self {
        Self {
            id: IdolId::new(),
            base_type,
            item_level,
            rarity,
            name: None,
            implicit: None,
            prefixes: Vec::new(),
            suffixes: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_implicit(mut self, implicit: ImplicitModifier) -> Self {
        self.implicit = Some(implicit);
        self
    }

    /// Append a modifier to the list its type belongs to.
    pub fn with_modifier(mut self, modifier: IdolModifier) -> Self {
        match modifier.mod_type {
            ModifierType::Prefix | ModifierType::Unique => self.prefixes.push(modifier),
            ModifierType::Suffix => self.suffixes.push(modifier),
        }
        self
    }

    /// All explicit modifiers, prefixes first.
    pub fn modifiers(&self) -> impl Iterator<Item = &IdolModifier> {
        self.prefixes.iter().chain(self.suffixes.iter())
    }

    /// Check the record-level rules persisted idols must satisfy.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(MIN_ITEM_LEVEL..=MAX_ITEM_LEVEL).contains(&self.item_level) {
            return Err(DomainError::validation(format!(
                "Item level must be between {} and {}, got {}",
                MIN_ITEM_LEVEL, MAX_ITEM_LEVEL, self.item_level
            )));
        }

        if self
            .prefixes
            .iter()
            .any(|m| m.mod_type == ModifierType::Suffix)
        {
            return Err(DomainError::validation("Suffix modifier stored as prefix"));
        }
        if self
            .suffixes
            .iter()
            .any(|m| m.mod_type != ModifierType::Suffix)
        {
            return Err(DomainError::validation("Non-suffix modifier stored as suffix"));
        }

        let prefix_count = self
            .prefixes
            .iter()
            .filter(|m| m.mod_type == ModifierType::Prefix)
            .count();
        if prefix_count > MAX_PREFIXES {
            return Err(DomainError::validation(format!(
                "Idol has {} prefixes, at most {} are allowed",
                prefix_count, MAX_PREFIXES
            )));
        }
        if self.suffixes.len() > MAX_SUFFIXES {
            return Err(DomainError::validation(format!(
                "Idol has {} suffixes, at most {} are allowed",
                self.suffixes.len(),
                MAX_SUFFIXES
            )));
        }

        if let Some(implicit) = &self.implicit {
            if !implicit.value.is_finite() {
                return Err(DomainError::validation("Implicit value must be finite"));
            }
        }

        self.modifiers().try_for_each(IdolModifier::validate)
    }
}
