use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Asset;
use super::settings::{AppSettings, DEFAULT_EXCHANGE_RATE};
use super::snapshot::Snapshot;

/// Storage key of the asset blob.
pub const ASSET_DATA_KEY: &str = "asset-tracker-data";

/// The live working set of assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentAssets {
    pub assets: Vec<Asset>,

    pub last_modified: DateTime<Utc>,

    /// TWD per USD
    pub exchange_rate: f64,
}

impl Default for CurrentAssets {
    fn default() -> Self {
        Self {
            assets: Vec::new(),
            last_modified: Utc::now(),
            exchange_rate: DEFAULT_EXCHANGE_RATE,
        }
    }
}

/// The main data container, persisted as one JSON blob under [`ASSET_DATA_KEY`].
///
/// Contains: the live asset list, the snapshot history and user settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppData {
    pub current_assets: CurrentAssets,

    /// Snapshot history, oldest first
    pub snapshots: Vec<Snapshot>,

    pub settings: AppSettings,
}

impl AppData {
    /// Most recent snapshot by date.
    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.snapshots.iter().max_by_key(|s| s.date)
    }
}
