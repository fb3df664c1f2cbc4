//! Map device loadout: five scarab slots and an optional crafting option

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CraftingOptionId, ScarabId};

pub const SCARAB_SLOT_COUNT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDevice {
    pub slots: [Option<ScarabId>; SCARAB_SLOT_COUNT],
    #[serde(default)]
    pub crafting_option_id: Option<CraftingOptionId>,
}

impl MapDevice {
    pub fn set_slot(&mut self, slot: usize, scarab: Option<ScarabId>) -> Result<(), DomainError> {
        let cell = self.slots.get_mut(slot).ok_or_else(|| {
            DomainError::validation(format!(
                "Scarab slot {} does not exist (device has {} slots)",
                slot, SCARAB_SLOT_COUNT
            ))
        })?;
        *cell = scarab;
        Ok(())
    }

    pub fn scarabs(&self) -> impl Iterator<Item = &ScarabId> {
        self.slots.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.scarabs().next().is_none() && self.crafting_option_id.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_device_is_empty() {
        let device = MapDevice::default();
        assert!(device.is_empty());
        assert_eq!(
            serde_json::to_value(&device).unwrap(),
            json!({ "slots": [null, null, null, null, null], "craftingOptionId": null })
        );
    }

    #[test]
    fn slot_index_checked() {
        let mut device = MapDevice::default();
        let scarab = ScarabId::parse("divination-scarab-of-curation").unwrap();
        device.set_slot(4, Some(scarab.clone())).unwrap();
        assert_eq!(device.scarabs().collect::<Vec<_>>(), vec![&scarab]);
        assert!(device.set_slot(5, Some(scarab)).is_err());
    }

    #[test]
    fn wrong_slot_count_rejected() {
        let value = json!({ "slots": [null, null, null, null] });
        assert!(serde_json::from_value::<MapDevice>(value).is_err());
    }
}
