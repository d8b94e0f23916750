use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::{Asset, Currency};

/// Frozen point-in-time copy of the whole asset list.
///
/// Totals are computed once at creation with the embedded exchange rate and
/// never recomputed against later rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,

    pub date: DateTime<Utc>,

    /// Deep copy of the asset list at `date`
    pub assets: Vec<Asset>,

    #[serde(rename = "totalValueTWD")]
    pub total_value_twd: f64,

    #[serde(rename = "totalValueUSD")]
    pub total_value_usd: f64,

    /// TWD per USD at `date`
    pub exchange_rate: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Snapshot {
    /// Precomputed total in the requested currency.
    pub fn total_in(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Twd => self.total_value_twd,
            Currency::Usd => self.total_value_usd,
        }
    }
}
