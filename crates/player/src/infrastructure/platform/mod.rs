//! Platform-specific implementations
//!
//! Implementations of the platform traits defined in
//! `ports/outbound/platform.rs`.

mod desktop;
mod memory;

pub use desktop::{default_data_dir, FileStorageProvider, SystemClock, STORAGE_FILE_NAME};
pub use memory::MemoryStorageProvider;

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub chrono::DateTime<chrono::Utc>);

#[cfg(test)]
impl crate::ports::outbound::ClockPort for FixedClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.0
    }
}
