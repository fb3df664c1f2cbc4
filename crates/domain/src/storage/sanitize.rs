//! Record-level pruning of a stored document.
//!
//! Works on the raw JSON value so one broken record costs only that record:
//! invalid sets are dropped from `sets`, invalid or duplicate inventory
//! entries are dropped from their set, and placements that are malformed,
//! dangling, or break the grid rules are dropped. Nothing is repaired; a
//! record either survives as stored or is removed.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;

use super::document::{StorageDocument, STORAGE_VERSION};
use super::migrate::detect_storage_version;
use crate::grid::{all_unlock_condition_ids, BlockedCells};
use crate::ids::SetId;
use crate::set::{partition_placements, IdolPlacement, IdolSet, InventoryIdol, MapDevice, SetName};

/// What sanitization kept and what it dropped
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeReport {
    pub document: StorageDocument,
    /// Version tag the stored document carried
    pub source_version: u64,
    pub dropped_sets: usize,
    pub dropped_inventory: usize,
    pub dropped_placements: usize,
    /// The stored active set id was unusable and was cleared
    pub active_set_reset: bool,
}

impl SanitizeReport {
    /// True when nothing was dropped or reset.
    pub fn is_clean(&self) -> bool {
        self.dropped_sets == 0
            && self.dropped_inventory == 0
            && self.dropped_placements == 0
            && !self.active_set_reset
    }
}

/// Fields every stored set carries regardless of version.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetHeader {
    id: SetId,
    name: SetName,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Counts {
    inventory: usize,
    placements: usize,
}

/// Prune a stored document down to its valid records.
///
/// Returns `None` when `value` is not an object with a `sets` array. Legacy
/// documents (version 1 to 3) get their version's structural defaults: the
/// global inventory copied into each set, an empty map device, every
/// condition unlocked. A document without a version tag is held to the
/// current schema.
pub fn sanitize_storage(value: &Value) -> Option<SanitizeReport> {
    let root = value.as_object()?;
    let stored_sets = root.get("sets")?.as_array()?;
    let version = detect_storage_version(value).unwrap_or(STORAGE_VERSION);

    let mut counts = Counts::default();
    let global_inventory = if version < 2 {
        let entries = root
            .get("inventory")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        Some(sanitize_inventory(entries, &mut counts))
    } else {
        None
    };

    let mut seen_sets = HashSet::new();
    let mut sets = Vec::with_capacity(stored_sets.len());
    let mut dropped_sets = 0;
    for stored in stored_sets {
        match sanitize_set(stored, version, global_inventory.as_deref(), &mut counts) {
            Some(set) if seen_sets.insert(set.id().clone()) => sets.push(set),
            _ => dropped_sets += 1,
        }
    }

    let (active_set_id, active_set_reset) = match root.get("activeSetId") {
        None | Some(Value::Null) => (None, false),
        Some(stored) => match SetId::deserialize(stored) {
            Ok(id) if seen_sets.contains(&id) => (Some(id), false),
            _ => (None, true),
        },
    };

    Some(SanitizeReport {
        document: StorageDocument::new(sets, active_set_id),
        source_version: version,
        dropped_sets,
        dropped_inventory: counts.inventory,
        dropped_placements: counts.placements,
        active_set_reset,
    })
}

fn sanitize_set(
    stored: &Value,
    version: u64,
    global_inventory: Option<&[InventoryIdol]>,
    counts: &mut Counts,
) -> Option<IdolSet> {
    let header = SetHeader::deserialize(stored).ok()?;

    let inventory = match global_inventory {
        Some(global) => global.to_vec(),
        None => {
            let entries = stored.get("inventory")?.as_array()?;
            sanitize_inventory(entries, counts)
        }
    };

    let map_device = if version < 3 {
        MapDevice::default()
    } else {
        MapDevice::deserialize(stored.get("mapDevice")?).ok()?
    };

    let unlocked_conditions = if version < 4 {
        all_unlock_condition_ids()
    } else {
        Vec::<String>::deserialize(stored.get("unlockedConditions")?).ok()?
    };

    let placements: Vec<IdolPlacement> = stored
        .get("placements")?
        .as_array()?
        .iter()
        .filter_map(|entry| {
            let placement = IdolPlacement::deserialize(entry).ok();
            if placement.is_none() {
                counts.placements += 1;
            }
            placement
        })
        .collect();
    let blocked = BlockedCells::for_unlocked(&unlocked_conditions);
    let (placements, dropped) = partition_placements(placements, &inventory, &blocked);
    counts.placements += dropped.len();

    let content_hash = stored
        .get("contentHash")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(IdolSet::from_parts(
        header.id,
        header.name,
        header.created_at,
        header.updated_at,
        placements,
        inventory,
        map_device,
        unlocked_conditions,
        content_hash,
    ))
}

/// Keep entries that parse and validate; a later entry reusing an id is dropped.
fn sanitize_inventory(entries: &[Value], counts: &mut Counts) -> Vec<InventoryIdol> {
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entries.len());
    for entry in entries {
        match InventoryIdol::deserialize(entry) {
            Ok(idol) if idol.validate().is_ok() && seen.insert(idol.id.clone()) => {
                kept.push(idol)
            }
            _ => counts.inventory += 1,
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn idol(id: &str, base: &str) -> Value {
        json!({
            "id": id,
            "idol": {
                "id": format!("idol-{}", id),
                "baseType": base,
                "itemLevel": 80,
                "rarity": "rare",
                "prefixes": [],
                "suffixes": []
            },
            "importedAt": 1_700_000_000_000_i64,
            "source": "manual"
        })
    }

    fn placement(id: &str, inventory_id: &str, x: i32, y: i32, tab: &str) -> Value {
        json!({ "id": id, "inventoryIdolId": inventory_id, "position": { "x": x, "y": y }, "tab": tab })
    }

    fn set(id: &str, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "createdAt": 1_700_000_000_000_i64,
            "updatedAt": 1_700_000_000_000_i64,
            "placements": [placement(&format!("{}-p", id), &format!("{}-inv", id), 1, 1, "tab1")],
            "inventory": [idol(&format!("{}-inv", id), "minor")],
            "mapDevice": { "slots": [null, null, null, null, null], "craftingOptionId": null },
            "unlockedConditions": all_unlock_condition_ids()
        })
    }

    fn document(sets: Vec<Value>, active: Option<&str>) -> Value {
        json!({ "version": 4, "sets": sets, "activeSetId": active })
    }

    fn set_ids(report: &SanitizeReport) -> Vec<&str> {
        report
            .document
            .sets()
            .iter()
            .map(|set| set.id().as_str())
            .collect()
    }

    mod sets {
        use super::*;

        #[test]
        fn invalid_set_dropped_and_siblings_kept_in_order() {
            let value = document(
                vec![set("a", "First"), set("b", "   "), set("c", "Third")],
                Some("a"),
            );
            let report = sanitize_storage(&value).unwrap();
            assert_eq!(set_ids(&report), vec!["a", "c"]);
            assert_eq!(report.dropped_sets, 1);
            assert_eq!(report.document.active_set_id().unwrap().as_str(), "a");
            assert!(!report.active_set_reset);
        }

        #[test]
        fn active_id_reset_when_its_set_is_dropped() {
            let value = document(
                vec![set("a", "First"), set("b", ""), set("c", "Third")],
                Some("b"),
            );
            let report = sanitize_storage(&value).unwrap();
            assert_eq!(set_ids(&report), vec!["a", "c"]);
            assert_eq!(report.document.active_set_id(), None);
            assert!(report.active_set_reset);
        }

        #[test]
        fn duplicate_set_id_keeps_first() {
            let value = document(vec![set("a", "First"), set("a", "Again")], None);
            let report = sanitize_storage(&value).unwrap();
            assert_eq!(report.document.sets().len(), 1);
            assert_eq!(report.document.sets()[0].name().as_str(), "First");
        }

        #[test]
        fn all_sets_invalid_gives_empty_document() {
            let value = document(vec![json!(42), json!({ "id": "x" })], Some("x"));
            let report = sanitize_storage(&value).unwrap();
            assert!(report.document.is_empty());
            assert_eq!(report.document.active_set_id(), None);
            assert_eq!(report.dropped_sets, 2);
        }

        #[test]
        fn current_set_missing_unlocks_is_dropped() {
            let mut broken = set("a", "First");
            broken.as_object_mut().unwrap().remove("unlockedConditions");
            let report = sanitize_storage(&document(vec![broken], None)).unwrap();
            assert_eq!(report.dropped_sets, 1);
        }

        #[test]
        fn not_a_document() {
            assert!(sanitize_storage(&json!([])).is_none());
            assert!(sanitize_storage(&json!({ "version": 4 })).is_none());
            assert!(sanitize_storage(&json!({ "sets": {} })).is_none());
        }
    }

    mod records {
        use super::*;

        #[test]
        fn invalid_inventory_entry_and_its_placement_dropped() {
            let mut stored = set("a", "First");
            stored["inventory"] = json!([
                idol("good", "noble"),
                { "id": "bad", "idol": { "baseType": "giant" } }
            ]);
            stored["placements"] = json!([
                placement("p1", "good", 1, 1, "tab1"),
                placement("p2", "bad", 4, 4, "tab1")
            ]);
            let report = sanitize_storage(&document(vec![stored], Some("a"))).unwrap();
            let set = &report.document.sets()[0];
            assert_eq!(set.inventory().len(), 1);
            assert_eq!(set.placements().len(), 1);
            assert_eq!(report.dropped_inventory, 1);
            assert_eq!(report.dropped_placements, 1);
            assert!(report.document.validate().is_ok());
        }

        #[test]
        fn duplicate_inventory_id_keeps_first() {
            let mut stored = set("a", "First");
            stored["inventory"] = json!([idol("same", "minor"), idol("same", "conqueror")]);
            stored["placements"] = json!([]);
            let report = sanitize_storage(&document(vec![stored], None)).unwrap();
            let set = &report.document.sets()[0];
            assert_eq!(set.inventory().len(), 1);
            assert_eq!(
                set.inventory()[0].idol.base_type,
                crate::idol::IdolBaseType::Minor
            );
        }

        #[test]
        fn placement_rule_violations_dropped() {
            let mut stored = set("a", "First");
            stored["inventory"] = json!([idol("big", "conqueror"), idol("small", "minor")]);
            stored["placements"] = json!([
                placement("p1", "big", 1, 0, "tab1"),
                placement("p2", "small", 2, 1, "tab1"),
                placement("p3", "small", 2, 2, "tab2"),
                placement("p4", "small", 5, 6, "tab3"),
                placement("", "small", 4, 4, "tab1"),
                placement("p6", "small", 4, 4, "tab9")
            ]);
            let report = sanitize_storage(&document(vec![stored], None)).unwrap();
            let kept: Vec<&str> = report.document.sets()[0]
                .placements()
                .iter()
                .map(|p| p.id.as_str())
                .collect();
            assert_eq!(kept, vec!["p1"]);
            assert_eq!(report.dropped_placements, 5);
        }

        #[test]
        fn placement_anchored_near_i32_max_dropped() {
            let mut stored = set("a", "First");
            stored["inventory"] = json!([idol("big", "conqueror"), idol("small", "minor")]);
            stored["placements"] = json!([
                placement("far", "big", i32::MAX, 1, "tab1"),
                placement("kept", "small", 1, 1, "tab1"),
                placement("tall", "small", 1, i32::MAX, "tab2")
            ]);
            let report = sanitize_storage(&document(vec![stored], None)).unwrap();
            let kept: Vec<&str> = report.document.sets()[0]
                .placements()
                .iter()
                .map(|p| p.id.as_str())
                .collect();
            assert_eq!(kept, vec!["kept"]);
            assert_eq!(report.dropped_placements, 2);
        }

        #[test]
        fn clean_document_reports_clean() {
            let value = document(vec![set("a", "First"), set("b", "Second")], Some("b"));
            let report = sanitize_storage(&value).unwrap();
            assert!(report.is_clean());
            assert_eq!(report.document.sets().len(), 2);
        }
    }

    mod legacy {
        use super::*;

        #[test]
        fn v1_document_gets_global_inventory_and_defaults() {
            let value = json!({
                "version": 1,
                "inventory": [idol("g1", "kamasan"), { "broken": true }],
                "sets": [
                    {
                        "id": "s1",
                        "name": "Old",
                        "createdAt": 1_700_000_000_000_i64,
                        "updatedAt": 1_700_000_000_000_i64,
                        "placements": [placement("p1", "g1", 1, 1, "tab1")]
                    },
                    {
                        "id": "s2",
                        "name": "Older",
                        "createdAt": 1_700_000_000_000_i64,
                        "updatedAt": 1_700_000_000_000_i64,
                        "placements": []
                    }
                ],
                "activeSetId": "s1"
            });
            let report = sanitize_storage(&value).unwrap();
            assert_eq!(report.source_version, 1);
            assert_eq!(report.dropped_inventory, 1);
            for set in report.document.sets() {
                assert_eq!(set.inventory().len(), 1);
                assert!(set.map_device().is_empty());
                assert_eq!(set.unlocked_conditions().len(), 4);
            }
            assert!(report.document.validate().is_ok());
        }

        #[test]
        fn v3_document_gets_unlocks() {
            let mut stored = set("a", "First");
            stored.as_object_mut().unwrap().remove("unlockedConditions");
            let value = json!({ "version": 3, "sets": [stored], "activeSetId": "a" });
            let report = sanitize_storage(&value).unwrap();
            assert_eq!(report.document.sets()[0].unlocked_conditions().len(), 4);
            assert!(report.is_clean());
        }
    }
}
