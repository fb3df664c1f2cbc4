//! Application error type

use idolplanner_domain::{DomainError, PlacementError};
use idolplanner_shared::ShareError;
use thiserror::Error;

use crate::ports::outbound::StorageError;

/// Errors surfaced by planner services
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("No active idol set")]
    NoActiveSet,

    #[error(transparent)]
    Placement(#[from] PlacementError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Share(#[from] ShareError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
