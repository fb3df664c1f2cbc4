//! Application services
//!
//! Use cases of the planner. Services depend on port traits, not concrete
//! infrastructure implementations.

pub mod import_service;
pub mod persistence;
pub mod planner_service;
pub mod share_service;

pub use import_service::ImportOutcome;
pub use persistence::{load_storage, save_storage, StorageNotice};
pub use planner_service::{PlannerService, DEFAULT_SET_NAME};
