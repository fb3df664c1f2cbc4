//! Scarab price contract served by `GET /api/prices/scarabs?league=<name>`

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use idolplanner_domain::{MapDevice, ScarabId};

/// Path of the scarab price endpoint
pub const SCARAB_PRICES_PATH: &str = "/api/prices/scarabs";

/// How often the backing price data is refreshed
pub const PRICE_REFRESH_MINUTES: i64 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScarabPrice {
    pub id: ScarabId,
    pub name: String,
    pub chaos_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divine_value: Option<f64>,
}

/// Cached price list for one league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScarabPriceDocument {
    pub league: String,
    pub prices: Vec<ScarabPrice>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl ScarabPriceDocument {
    pub fn price_of(&self, id: &ScarabId) -> Option<&ScarabPrice> {
        self.prices.iter().find(|price| &price.id == id)
    }

    /// Chaos cost of the scarabs slotted in a map device. Scarabs without a
    /// price count as zero.
    pub fn loadout_cost(&self, device: &MapDevice) -> f64 {
        device
            .scarabs()
            .filter_map(|id| self.price_of(id))
            .map(|price| price.chaos_value)
            .sum()
    }

    /// Older than one refresh interval at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now - self.updated_at > Duration::minutes(PRICE_REFRESH_MINUTES)
    }
}

/// Request path for a league's prices
pub fn scarab_prices_path(league: &str) -> String {
    let league: String = league
        .chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '#' => "%23".to_string(),
            other => other.to_string(),
        })
        .collect();
    format!("{}?league={}", SCARAB_PRICES_PATH, league)
}
