//! Legacy storage schemas and the migrators between them.
//!
//! - V1: one global inventory, sets hold placements only
//! - V2: inventory moves into each set
//! - V3: each set gains a map device
//! - V4 (current): each set gains its unlocked conditions

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::document::StorageDocument;
use crate::grid::all_unlock_condition_ids;
use crate::ids::SetId;
use crate::set::{IdolPlacement, IdolSet, InventoryIdol, MapDevice, SetName};

/// A `version` field that only accepts the literal `N`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct VersionTag<const N: u64>;

impl<const N: u64> Serialize for VersionTag<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(N)
    }
}

impl<'de, const N: u64> Deserialize<'de> for VersionTag<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let version = u64::deserialize(deserializer)?;
        if version == N {
            Ok(Self)
        } else {
            Err(de::Error::custom(format!(
                "expected storage version {}, found {}",
                N, version
            )))
        }
    }
}

// =============================================================================
// V1
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetV1 {
    pub id: SetId,
    pub name: SetName,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub placements: Vec<IdolPlacement>,
    #[serde(default)]
    pub content_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StorageV1 {
    #[allow(dead_code)]
    pub version: VersionTag<1>,
    pub sets: Vec<SetV1>,
    pub inventory: Vec<InventoryIdol>,
    #[serde(default)]
    pub active_set_id: Option<SetId>,
}

// =============================================================================
// V2
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetV2 {
    pub id: SetId,
    pub name: SetName,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub placements: Vec<IdolPlacement>,
    pub inventory: Vec<InventoryIdol>,
    #[serde(default)]
    pub content_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StorageV2 {
    #[allow(dead_code)]
    pub version: VersionTag<2>,
    pub sets: Vec<SetV2>,
    #[serde(default)]
    pub active_set_id: Option<SetId>,
}

/// Every set receives a copy of the global inventory.
impl From<StorageV1> for StorageV2 {
    fn from(v1: StorageV1) -> Self {
        let inventory = v1.inventory;
        let sets = v1
            .sets
            .into_iter()
            .map(|set| SetV2 {
                id: set.id,
                name: set.name,
                created_at: set.created_at,
                updated_at: set.updated_at,
                placements: set.placements,
                inventory: inventory.clone(),
                content_hash: set.content_hash,
            })
            .collect();
        Self {
            version: VersionTag,
            sets,
            active_set_id: v1.active_set_id,
        }
    }
}

// =============================================================================
// V3
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetV3 {
    pub id: SetId,
    pub name: SetName,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    pub placements: Vec<IdolPlacement>,
    pub inventory: Vec<InventoryIdol>,
    pub map_device: MapDevice,
    #[serde(default)]
    pub content_hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StorageV3 {
    #[allow(dead_code)]
    pub version: VersionTag<3>,
    pub sets: Vec<SetV3>,
    #[serde(default)]
    pub active_set_id: Option<SetId>,
}

/// Each set gets an empty map device.
impl From<StorageV2> for StorageV3 {
    fn from(v2: StorageV2) -> Self {
        let sets = v2
            .sets
            .into_iter()
            .map(|set| SetV3 {
                id: set.id,
                name: set.name,
                created_at: set.created_at,
                updated_at: set.updated_at,
                placements: set.placements,
                inventory: set.inventory,
                map_device: MapDevice::default(),
                content_hash: set.content_hash,
            })
            .collect();
        Self {
            version: VersionTag,
            sets,
            active_set_id: v2.active_set_id,
        }
    }
}

/// Each set starts with every condition unlocked.
impl From<StorageV3> for StorageDocument {
    fn from(v3: StorageV3) -> Self {
        let sets = v3
            .sets
            .into_iter()
            .map(|set| {
                IdolSet::from_parts(
                    set.id,
                    set.name,
                    set.created_at,
                    set.updated_at,
                    set.placements,
                    set.inventory,
                    set.map_device,
                    all_unlock_condition_ids(),
                    set.content_hash,
                )
            })
            .collect();
        StorageDocument::new(sets, v3.active_set_id)
    }
}
