//! Content hash for idol sets.
//!
//! Two sets hash equal when they place equivalent idols at the same anchors on
//! the same tabs. Identity and bookkeeping (set id, name, timestamps, inventory
//! and placement ids, idol names) are left out so that shared or duplicated
//! sets can be recognised by what they contain.

use sha2::{Digest, Sha256};

use super::IdolSet;
use crate::idol::IdolInstance;

/// Bytes of the SHA-256 digest kept in the hash (16 hex chars).
const HASH_BYTES: usize = 8;

/// Stable text form of the parts of an idol that affect the layout's effect.
fn idol_fingerprint(idol: &IdolInstance) -> String {
    let mut out = format!(
        "{}|{}|ilvl{}",
        idol.base_type.key(),
        idol.rarity,
        idol.item_level
    );
    if let Some(implicit) = &idol.implicit {
        out.push_str(&format!("|implicit:{}={}", implicit.text, implicit.value));
    }
    for modifier in idol.modifiers() {
        out.push_str(&format!("|{}={}", modifier.mod_id, modifier.value));
        if let Some(tier) = modifier.tier {
            out.push_str(&format!("@t{}", tier));
        }
    }
    out
}

/// Compute the content hash of a set's placements.
pub fn compute_set_hash(set: &IdolSet) -> String {
    let mut lines: Vec<String> = set
        .placements()
        .iter()
        .filter_map(|placement| {
            let entry = set.find_inventory_idol(&placement.inventory_idol_id)?;
            Some(format!(
                "{}|{}|{}|{}",
                placement.tab,
                placement.position.x,
                placement.position.y,
                idol_fingerprint(&entry.idol)
            ))
        })
        .collect();
    lines.sort();

    let mut hasher = Sha256::new();
    for line in &lines {
        hasher.update(b"placement:");
        hasher.update(line.as_bytes());
        hasher.update(b"\n");
    }
    let digest = hasher.finalize();
    hex::encode(&digest[..HASH_BYTES])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridPosition, GridTab};
    use crate::idol::{IdolBaseType, IdolModifier, ModifierType, Rarity};
    use crate::ids::ModifierId;
    use crate::set::{IdolSource, SetName};
    use chrono::{TimeZone, Utc};

    fn legion_idol(value: f64) -> IdolInstance {
        IdolInstance::new(IdolBaseType::Noble, 82, Rarity::Rare).with_modifier(IdolModifier {
            mod_id: ModifierId::parse("legion_chance").unwrap(),
            mod_type: ModifierType::Prefix,
            text: "Your Maps have #% chance to contain a Legion Encounter".into(),
            value,
            tier: Some(1),
            mechanic: Some("legion".into()),
        })
    }

    fn set_named(name: &str, minute: u32, position: GridPosition) -> IdolSet {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, minute, 0).unwrap();
        let mut set = IdolSet::new(SetName::new(name).unwrap(), now);
        let ids = set.add_idols(vec![legion_idol(65.0)], IdolSource::Manual, now);
        set.place_idol(&ids[0], position, GridTab::Tab2, now).unwrap();
        set
    }

    #[test]
    fn hash_ignores_identity_and_timestamps() {
        let a = set_named("First", 0, GridPosition::new(1, 1));
        let b = set_named("Second", 30, GridPosition::new(1, 1));
        assert_eq!(compute_set_hash(&a), compute_set_hash(&b));
    }

    #[test]
    fn hash_changes_with_position() {
        let a = set_named("Set", 0, GridPosition::new(1, 1));
        let b = set_named("Set", 0, GridPosition::new(3, 1));
        assert_ne!(compute_set_hash(&a), compute_set_hash(&b));
    }

    #[test]
    fn hash_changes_with_modifier_value() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let mut a = IdolSet::new(SetName::new("A").unwrap(), now);
        let mut b = IdolSet::new(SetName::new("B").unwrap(), now);
        let ia = a.add_idols(vec![legion_idol(65.0)], IdolSource::Manual, now);
        let ib = b.add_idols(vec![legion_idol(60.0)], IdolSource::Manual, now);
        a.place_idol(&ia[0], GridPosition::new(1, 1), GridTab::Tab1, now).unwrap();
        b.place_idol(&ib[0], GridPosition::new(1, 1), GridTab::Tab1, now).unwrap();
        assert_ne!(compute_set_hash(&a), compute_set_hash(&b));
    }

    #[test]
    fn hash_is_sixteen_hex_chars() {
        let set = set_named("Set", 0, GridPosition::new(1, 1));
        let hash = compute_set_hash(&set);
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
