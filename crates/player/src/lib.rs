//! Idol Planner player crate.
//!
//! Storage and clock ports with their desktop adapters, the planner services
//! that load, mutate and save the planner document, configuration, and the
//! text views used by the `idolplanner` binary.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod presentation;

pub use application::{PlannerError, PlannerService, StorageNotice};
pub use config::{ConfigError, PlannerConfig};
