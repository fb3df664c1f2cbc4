//! Whole-document migration: dispatch on the `version` tag, validate against
//! that version's schema, then apply the remaining migrators.

use serde::Deserialize;
use serde_json::Value;

use super::document::{CurrentStorage, StorageDocument, STORAGE_VERSION};
use super::schema::{StorageV1, StorageV2, StorageV3};
use crate::error::DomainError;

/// The `version` tag of a stored document, if it carries one.
pub fn detect_storage_version(value: &Value) -> Option<u64> {
    value.get("version")?.as_u64()
}

/// Upgrade a stored document to the current schema.
///
/// Fails when the document has no version tag, does not match the schema of
/// its version, or breaks a cross-record rule after migration. Nothing is
/// repaired here; see `sanitize_storage` for record-level pruning.
pub fn migrate_storage(value: &Value) -> Result<StorageDocument, DomainError> {
    let version = detect_storage_version(value)
        .ok_or_else(|| DomainError::parse("Storage document has no version"))?;

    let document = match version {
        1 => StorageDocument::from(StorageV3::from(StorageV2::from(
            StorageV1::deserialize(value).map_err(schema_error(1))?,
        ))),
        2 => StorageDocument::from(StorageV3::from(
            StorageV2::deserialize(value).map_err(schema_error(2))?,
        )),
        3 => StorageDocument::from(StorageV3::deserialize(value).map_err(schema_error(3))?),
        v if v >= STORAGE_VERSION => {
            StorageDocument::try_from(CurrentStorage::deserialize(value).map_err(schema_error(v))?)?
        }
        other => {
            return Err(DomainError::parse(format!(
                "Unknown storage version {}",
                other
            )))
        }
    };

    document.validate()?;
    Ok(document)
}

/// `migrate_storage` with the error discarded; callers fall back to an empty
/// document or to sanitization.
pub fn parse_and_migrate_storage(value: &Value) -> Option<StorageDocument> {
    migrate_storage(value).ok()
}

fn schema_error(version: u64) -> impl Fn(serde_json::Error) -> DomainError {
    move |error| DomainError::parse(format!("Storage schema v{}: {}", version, error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{all_unlock_condition_ids, GridPosition, GridTab};
    use crate::idol::{IdolBaseType, IdolInstance, Rarity};
    use crate::set::{IdolSource, MapDevice, SetName};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn idol_json(id: &str, base: &str) -> Value {
        json!({
            "id": id,
            "idol": {
                "id": format!("idol-{}", id),
                "baseType": base,
                "itemLevel": 83,
                "rarity": "rare",
                "prefixes": [],
                "suffixes": []
            },
            "importedAt": 1_700_000_000_000_i64,
            "source": "clipboard",
            "usageCount": 1
        })
    }

    fn v1_fixture() -> Value {
        json!({
            "version": 1,
            "inventory": [idol_json("inv-a", "conqueror"), idol_json("inv-b", "minor")],
            "sets": [
                {
                    "id": "set-1",
                    "name": "Legion",
                    "createdAt": 1_700_000_000_000_i64,
                    "updatedAt": 1_700_000_100_000_i64,
                    "placements": [
                        { "id": "p-1", "inventoryIdolId": "inv-a", "position": { "x": 1, "y": 0 }, "tab": "tab1" }
                    ]
                },
                {
                    "id": "set-2",
                    "name": "Breach",
                    "createdAt": 1_700_000_000_000_i64,
                    "updatedAt": 1_700_000_000_000_i64,
                    "placements": []
                }
            ],
            "activeSetId": "set-2"
        })
    }

    mod dispatch {
        use super::*;

        #[test]
        fn missing_version_is_rejected() {
            let value = json!({ "sets": [], "activeSetId": null });
            assert!(parse_and_migrate_storage(&value).is_none());
        }

        #[test]
        fn version_zero_is_rejected() {
            let value = json!({ "version": 0, "sets": [] });
            assert!(parse_and_migrate_storage(&value).is_none());
        }

        #[test]
        fn v4_shape_with_one_corrupt_field_fails_whole_document() {
            let mut value = serde_json::to_value(sample_document()).unwrap();
            value["sets"][0]["name"] = json!("   ");
            assert!(parse_and_migrate_storage(&value).is_none());
        }

        #[test]
        fn v3_document_tagged_as_v4_fails() {
            let mut value = serde_json::to_value(sample_document()).unwrap();
            value["sets"][0]
                .as_object_mut()
                .unwrap()
                .remove("unlockedConditions");
            assert!(parse_and_migrate_storage(&value).is_none());
        }

        #[test]
        fn newer_version_is_read_as_current() {
            let original = sample_document();
            let mut value = serde_json::to_value(&original).unwrap();
            value["version"] = json!(5);
            let document = parse_and_migrate_storage(&value).unwrap();
            assert_eq!(document, original);
            assert_eq!(
                serde_json::to_value(&document).unwrap()["version"],
                json!(STORAGE_VERSION)
            );
        }

        #[test]
        fn placement_anchored_near_i32_max_fails_document() {
            let mut value = serde_json::to_value(sample_document()).unwrap();
            value["sets"][0]["placements"][0]["position"] = json!({ "x": i32::MAX, "y": 1 });
            assert!(parse_and_migrate_storage(&value).is_none());
        }
    }

    fn sample_document() -> StorageDocument {
        let now = Utc.with_ymd_and_hms(2025, 4, 2, 10, 0, 0).unwrap();
        let mut document = StorageDocument::empty();
        let id = document.create_set(SetName::new("Current").unwrap(), now);
        let set = document.find_set_mut(&id).unwrap();
        let ids = set.add_idols(
            vec![
                IdolInstance::new(IdolBaseType::Totemic, 84, Rarity::Rare).with_name("Grim Effigy"),
                IdolInstance::new(IdolBaseType::Burial, 79, Rarity::Magic),
            ],
            IdolSource::Clipboard,
            now,
        );
        set.place_idol(&ids[0], GridPosition::new(0, 2), GridTab::Tab1, now)
            .unwrap();
        set.place_idol(&ids[1], GridPosition::new(1, 0), GridTab::Tab3, now)
            .unwrap();
        document
    }

    #[test]
    fn current_document_is_returned_unchanged() {
        let document = sample_document();
        let value = serde_json::to_value(&document).unwrap();
        let migrated = parse_and_migrate_storage(&value).unwrap();
        assert_eq!(migrated, document);
        assert_eq!(serde_json::to_value(&migrated).unwrap(), value);
    }

    #[test]
    fn migrating_twice_is_a_no_op() {
        let once = parse_and_migrate_storage(&v1_fixture()).unwrap();
        let value = serde_json::to_value(&once).unwrap();
        let twice = parse_and_migrate_storage(&value).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn v1_fixture_reaches_current_schema() {
        let document = parse_and_migrate_storage(&v1_fixture()).unwrap();
        assert!(document.validate().is_ok());
        assert_eq!(document.sets().len(), 2);
        assert_eq!(document.active_set_id().unwrap().as_str(), "set-2");

        for set in document.sets() {
            assert_eq!(set.inventory().len(), 2);
            assert_eq!(set.map_device(), &MapDevice::default());
            assert_eq!(set.unlocked_conditions(), all_unlock_condition_ids().as_slice());
        }

        let value = serde_json::to_value(&document).unwrap();
        assert_eq!(value["version"], json!(4));
        assert!(value["sets"][0]["inventory"][0].get("usageCount").is_none());
    }

    #[test]
    fn v2_fixture_gains_map_device_and_unlocks() {
        let value = json!({
            "version": 2,
            "sets": [{
                "id": "set-1",
                "name": "Harvest",
                "createdAt": 1_700_000_000_000_i64,
                "updatedAt": 1_700_000_000_000_i64,
                "inventory": [idol_json("inv-a", "noble")],
                "placements": [
                    { "id": "p-1", "inventoryIdolId": "inv-a", "position": { "x": 3, "y": 1 }, "tab": "tab2" }
                ]
            }],
            "activeSetId": "set-1"
        });
        let document = parse_and_migrate_storage(&value).unwrap();
        let set = &document.sets()[0];
        assert!(set.map_device().is_empty());
        assert_eq!(set.unlocked_conditions().len(), 4);
        assert_eq!(set.placements().len(), 1);
    }

    #[test]
    fn v3_fixture_gains_unlocks() {
        let value = json!({
            "version": 3,
            "sets": [{
                "id": "set-1",
                "name": "Scarabs",
                "createdAt": 1_700_000_000_000_i64,
                "updatedAt": 1_700_000_000_000_i64,
                "inventory": [],
                "placements": [],
                "mapDevice": {
                    "slots": ["ambush-scarab", null, null, null, null],
                    "craftingOptionId": null
                }
            }],
            "activeSetId": null
        });
        let document = parse_and_migrate_storage(&value).unwrap();
        let set = &document.sets()[0];
        assert_eq!(set.map_device().scarabs().count(), 1);
        assert_eq!(set.unlocked_conditions().len(), 4);
        assert_eq!(document.active_set_id(), None);
    }

    #[test]
    fn overlapping_placements_fail_migration() {
        let mut value = v1_fixture();
        value["sets"][0]["placements"] = json!([
            { "id": "p-1", "inventoryIdolId": "inv-a", "position": { "x": 1, "y": 0 }, "tab": "tab1" },
            { "id": "p-2", "inventoryIdolId": "inv-b", "position": { "x": 2, "y": 1 }, "tab": "tab1" }
        ]);
        let err = migrate_storage(&value).unwrap_err();
        assert!(err.to_string().contains("occupied"));
    }
}
