//! Modifier value objects attached to idols

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::ids::ModifierId;

/// Highest tier a rolled modifier can carry
pub const MAX_TIER: u8 = 10;

/// Where a modifier sits on an idol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierType {
    Prefix,
    Suffix,
    Unique,
}

impl fmt::Display for ModifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => write!(f, "prefix"),
            Self::Suffix => write!(f, "suffix"),
            Self::Unique => write!(f, "unique"),
        }
    }
}

/// A rolled explicit modifier resolved against the modifier catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdolModifier {
    pub mod_id: ModifierId,
    #[serde(rename = "type")]
    pub mod_type: ModifierType,
    pub text: String,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<u8>,
    /// Game-content category (e.g. "legion", "breach")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanic: Option<String>,
}

impl IdolModifier {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(tier) = self.tier {
            if !(1..=MAX_TIER).contains(&tier) {
                return Err(DomainError::validation(format!(
                    "Modifier tier must be between 1 and {}, got {}",
                    MAX_TIER, tier
                )));
            }
        }
        if !self.value.is_finite() {
            return Err(DomainError::validation("Modifier value must be finite"));
        }
        Ok(())
    }
}

/// The single implicit line an idol base rolls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImplicitModifier {
    pub text: String,
    pub value: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modifier(tier: Option<u8>) -> IdolModifier {
        IdolModifier {
            mod_id: ModifierId::parse("legion_chance").unwrap(),
            mod_type: ModifierType::Prefix,
            text: "Your Maps have +65% chance to contain a Legion Encounter".into(),
            value: 65.0,
            tier,
            mechanic: Some("legion".into()),
        }
    }

    #[test]
    fn tier_range_enforced() {
        assert!(modifier(Some(1)).validate().is_ok());
        assert!(modifier(Some(10)).validate().is_ok());
        assert!(modifier(None).validate().is_ok());
        assert!(modifier(Some(0)).validate().is_err());
        assert!(modifier(Some(11)).validate().is_err());
    }

    #[test]
    fn serializes_type_tag() {
        let json = serde_json::to_value(modifier(Some(2))).unwrap();
        assert_eq!(json["type"], "prefix");
        assert_eq!(json["modId"], "legion_chance");
    }
}
