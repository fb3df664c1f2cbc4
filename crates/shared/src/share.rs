//! Share-link contracts
//!
//! `POST /api/share` takes a [`ShareRequest`] and answers with a
//! [`ShareResponse`]; `GET /api/share/:id` answers with the stored
//! [`SharedSetPayload`].

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use idolplanner_domain::{DomainError, IdolSet, InventoryIdol};

/// Length of every share id
pub const SHARE_ID_LENGTH: usize = 10;

/// Path of the share endpoint
pub const SHARE_API_PATH: &str = "/api/share";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("Invalid share id: {0}")]
    InvalidShareId(String),

    #[error("Shared set references inventory idol {0} that is not in the payload")]
    MissingInventoryIdol(String),

    #[error("Shared set is invalid: {0}")]
    InvalidSet(#[from] DomainError),

    #[error("Could not decode shared payload: {0}")]
    Decode(String),
}

/// A share token: exactly ten ASCII letters or digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ShareId(String);

impl ShareId {
    pub fn parse(value: impl Into<String>) -> Result<Self, ShareError> {
        let value = value.into();
        let valid = value.len() == SHARE_ID_LENGTH
            && value.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid {
            return Err(ShareError::InvalidShareId(value));
        }
        Ok(Self(value))
    }

    /// Draw a fresh id from `rng`.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let id = (0..SHARE_ID_LENGTH)
            .map(|_| char::from(rng.sample(Alphanumeric)))
            .collect();
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// API path that serves this share
    pub fn api_path(&self) -> String {
        format!("{}/{}", SHARE_API_PATH, self.0)
    }
}

impl fmt::Display for ShareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ShareId {
    type Error = ShareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ShareId> for String {
    fn from(id: ShareId) -> String {
        id.0
    }
}

/// Public link for a share id
pub fn share_url(base_url: &str, id: &ShareId) -> String {
    format!("{}/share/{}", base_url.trim_end_matches('/'), id)
}

/// Every placement must reference an entry of `inventory`.
fn check_references(set: &IdolSet, inventory: &[InventoryIdol]) -> Result<(), ShareError> {
    set.validate()?;
    for placement in set.placements() {
        let present = inventory
            .iter()
            .any(|entry| entry.id == placement.inventory_idol_id);
        if !present {
            return Err(ShareError::MissingInventoryIdol(
                placement.inventory_idol_id.to_string(),
            ));
        }
    }
    Ok(())
}

/// Body of `POST /api/share`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub set: IdolSet,
    pub inventory: Vec<InventoryIdol>,
}

impl ShareRequest {
    /// Share a set with the inventory entries its placements use.
    pub fn from_set(set: &IdolSet) -> Self {
        let inventory = set
            .inventory()
            .iter()
            .filter(|entry| set.usage_count(&entry.id) > 0)
            .cloned()
            .collect();
        Self {
            set: set.clone(),
            inventory,
        }
    }

    pub fn validate(&self) -> Result<(), ShareError> {
        check_references(&self.set, &self.inventory)
    }
}

/// Answer to `POST /api/share`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_id: ShareId,
    pub share_url: String,
}

impl ShareResponse {
    pub fn new(share_id: ShareId, base_url: &str) -> Self {
        let share_url = share_url(base_url, &share_id);
        Self {
            share_id,
            share_url,
        }
    }
}

/// Body of `GET /api/share/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSetPayload {
    pub set: IdolSet,
    pub inventory: Vec<InventoryIdol>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl SharedSetPayload {
    pub fn validate(&self) -> Result<(), ShareError> {
        check_references(&self.set, &self.inventory)
    }
}

impl From<ShareRequest> for SharedSetPayload {
    fn from(request: ShareRequest) -> Self {
        Self {
            set: request.set,
            inventory: request.inventory,
            created_at: None,
        }
    }
}

/// Decode and validate a shared payload.
pub fn decode_shared_payload(json: &str) -> Result<SharedSetPayload, ShareError> {
    let payload: SharedSetPayload = serde_json::from_str(json).map_err(|e| {
        tracing::warn!(error = %e, "Shared payload is not valid JSON for a set");
        ShareError::Decode(e.to_string())
    })?;
    payload.validate().inspect_err(|e| {
        tracing::warn!(set_id = %payload.set.id(), error = %e, "Shared payload failed validation");
    })?;
    tracing::debug!(
        set_id = %payload.set.id(),
        placements = payload.set.placements().len(),
        inventory = payload.inventory.len(),
        "Decoded shared payload"
    );
    Ok(payload)
}
