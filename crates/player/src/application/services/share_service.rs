//! Share export and import
//!
//! Export turns the active set into the body of `POST /api/share`; import
//! takes what `GET /api/share/:id` returned and adds it as a new local set.

use idolplanner_domain::{IdolSet, IdolSource, SetId, SetName};
use idolplanner_shared::{decode_shared_payload, ShareRequest, SharedSetPayload};

use super::planner_service::PlannerService;
use crate::application::error::PlannerError;
use crate::ports::outbound::{ClockPort, StorageProvider};

impl<S: StorageProvider, C: ClockPort> PlannerService<S, C> {
    /// Share request for the active set, carrying the inventory its
    /// placements use.
    pub fn export_share_request(&self) -> Result<ShareRequest, PlannerError> {
        let set = self.active_set().ok_or(PlannerError::NoActiveSet)?;
        let request = ShareRequest::from_set(set);
        request.validate()?;
        tracing::debug!(set_id = %set.id(), inventory = request.inventory.len(), "Built share request");
        Ok(request)
    }

    /// Decode a shared payload and add it as a new active set.
    pub fn import_shared_json(
        &mut self,
        json: &str,
        name: Option<&str>,
    ) -> Result<SetId, PlannerError> {
        let payload = decode_shared_payload(json)?;
        self.import_shared_set(payload, name)
    }

    /// Add a shared set under a new id. Its inventory entries are marked as
    /// shared; placements and the map device are kept.
    pub fn import_shared_set(
        &mut self,
        payload: SharedSetPayload,
        name: Option<&str>,
    ) -> Result<SetId, PlannerError> {
        payload.validate()?;
        let name = match name {
            Some(name) => SetName::new(name)?,
            None => payload.set.name().clone(),
        };
        let now = self.now();
        let copy = payload.set.duplicate(name, now);
        let inventory = payload
            .inventory
            .into_iter()
            .map(|mut entry| {
                entry.source = IdolSource::Shared;
                entry
            })
            .collect();
        let set = IdolSet::from_parts(
            copy.id().clone(),
            copy.name().clone(),
            now,
            now,
            copy.placements().to_vec(),
            inventory,
            copy.map_device().clone(),
            copy.unlocked_conditions().to_vec(),
            None,
        );

        let id = self.adopt_set(set)?;
        tracing::info!(source_set_id = %payload.set.id(), set_id = %id, "Imported shared set");
        Ok(id)
    }
}
