//! Inventory entries owned by an idol set

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::idol::IdolInstance;
use crate::ids::InventoryIdolId;

/// How an idol entered the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdolSource {
    Clipboard,
    Manual,
    Shared,
}

impl std::fmt::Display for IdolSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clipboard => write!(f, "clipboard"),
            Self::Manual => write!(f, "manual"),
            Self::Shared => write!(f, "shared"),
        }
    }
}

/// An idol kept in a set's inventory.
///
/// How many placements use the entry is derived from the set
/// (`IdolSet::usage_count`) and is not stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryIdol {
    pub id: InventoryIdolId,
    pub idol: IdolInstance,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub imported_at: DateTime<Utc>,
    pub source: IdolSource,
}

impl InventoryIdol {
    pub fn new(idol: IdolInstance, source: IdolSource, imported_at: DateTime<Utc>) -> Self {
        Self {
            id: InventoryIdolId::new(),
            idol,
            imported_at,
            source,
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.idol.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idol::{IdolBaseType, Rarity};
    use serde_json::json;

    #[test]
    fn timestamps_persist_as_epoch_millis() {
        let entry = InventoryIdol::new(
            IdolInstance::new(IdolBaseType::Minor, 75, Rarity::Magic),
            IdolSource::Clipboard,
            DateTime::from_timestamp_millis(1_700_000_000_123).unwrap(),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["importedAt"], json!(1_700_000_000_123_i64));
        assert_eq!(value["source"], "clipboard");
        assert!(value.get("usageCount").is_none());
    }

    #[test]
    fn persisted_usage_count_is_ignored() {
        let value = json!({
            "id": "inv-1",
            "idol": {
                "id": "idol-1",
                "baseType": "noble",
                "itemLevel": 81,
                "rarity": "rare",
                "prefixes": [],
                "suffixes": []
            },
            "importedAt": 1_700_000_000_000_i64,
            "source": "manual",
            "usageCount": 3
        });
        let entry: InventoryIdol = serde_json::from_value(value).unwrap();
        assert_eq!(entry.id.as_str(), "inv-1");
        assert_eq!(entry.idol.base_type, IdolBaseType::Noble);
    }
}
