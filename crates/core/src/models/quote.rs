use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest quote for a stock, as returned by every quote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    pub price: f64,
    /// ISO currency code reported by the provider (e.g., "TWD", "USD")
    pub currency: String,
    pub change: f64,
    pub change_percent: f64,
    pub last_updated: DateTime<Utc>,
}

/// Outcome of a price refresh over the live asset list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    /// Asset ids whose value was updated
    pub updated: Vec<String>,

    /// (asset id, reason) for every stock that could not be refreshed
    pub failed: Vec<(String, String)>,

    /// Stocks without a symbol or share count
    pub skipped: Vec<String>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
