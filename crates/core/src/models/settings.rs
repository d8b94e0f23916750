use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::asset::{AssetType, Currency};

/// Default number of days between automatic snapshots.
pub const DEFAULT_SNAPSHOT_INTERVAL_DAYS: u32 = 30;

/// Default TWD per USD used before a live rate has been fetched.
pub const DEFAULT_EXCHANGE_RATE: f64 = 31.5;

/// Which quote backend is tried first when refreshing prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteSource {
    Yahoo,
    AlphaVantage,
}

/// Where prices and exchange rates come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub provider: QuoteSource,

    /// Keys: provider name (e.g., "alphavantage"). Values: the API key string.
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,

    /// Proxy prefixes tried in order after the direct request fails.
    /// The target URL is appended (percent-encoded) to each prefix.
    #[serde(default)]
    pub proxy_endpoints: Vec<String>,

    #[serde(default)]
    pub auto_update_prices: bool,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        Self {
            provider: QuoteSource::Yahoo,
            api_keys: BTreeMap::new(),
            proxy_endpoints: vec![
                "https://corsproxy.io/?".to_string(),
                "https://api.allorigins.win/raw?url=".to_string(),
            ],
            auto_update_prices: false,
        }
    }
}

/// User-configurable settings, stored inside the persisted asset blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Days that must elapse before the next automatic snapshot
    pub snapshot_interval: u32,

    pub default_currency: Currency,

    /// Desired allocation per asset type, in percent
    #[serde(default)]
    pub target_allocation: BTreeMap<AssetType, f64>,

    #[serde(default)]
    pub data_source: DataSourceConfig,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL_DAYS,
            default_currency: Currency::Twd,
            target_allocation: BTreeMap::new(),
            data_source: DataSourceConfig::default(),
        }
    }
}
