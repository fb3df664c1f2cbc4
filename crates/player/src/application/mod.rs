pub mod error;
pub mod services;

pub use error::PlannerError;
pub use services::{
    load_storage, save_storage, ImportOutcome, PlannerService, StorageNotice, DEFAULT_SET_NAME,
};
