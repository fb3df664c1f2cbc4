//! Idol Planner Shared - wire contracts between the planner client and the
//! share and price endpoints
//!
//! # Design Principles
//!
//! 1. **No business logic** - data types, validation of payloads, paths
//! 2. **Domain vocabulary** - payloads carry domain sets and inventory entries
//!    exactly as they are persisted

pub mod fetch;
pub mod prices;
pub mod share;

pub use fetch::FetchState;
pub use prices::{scarab_prices_path, ScarabPrice, ScarabPriceDocument, SCARAB_PRICES_PATH};
pub use share::{
    decode_shared_payload, share_url, ShareError, ShareId, ShareRequest, ShareResponse,
    SharedSetPayload, SHARE_API_PATH, SHARE_ID_LENGTH,
};
