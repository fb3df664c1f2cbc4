//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to persist data and read the time without
//! depending on concrete implementations.

pub mod platform;

pub use platform::{storage_keys, ClockPort, StorageError, StorageProvider};

#[cfg(any(test, feature = "testing"))]
pub use platform::{MockClockPort, MockStorageProvider};
