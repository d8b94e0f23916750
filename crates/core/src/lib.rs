pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;
pub mod wishlist_tracker;

use chrono::Utc;
use log::{info, warn};
use models::{
    analytics::{GrowthAnalysis, GrowthSourcesReport, PortfolioSummary},
    app_data::{AppData, ASSET_DATA_KEY},
    asset::{Asset, AssetType, AssetUpdate, Currency},
    chart::ChartDataPoint,
    quote::RefreshReport,
    settings::AppSettings,
    snapshot::Snapshot,
};
use providers::registry::QuoteProviderRegistry;
use services::{
    analytics_service::AnalyticsService,
    asset_service::AssetService,
    chart_service, currency_service, growth_service,
    quote_service::QuoteService,
    snapshot_service::{create_snapshot, is_snapshot_needed},
};
use std::sync::Arc;
use storage::{
    local::LocalStorage,
    store::{KeyValueStore, MemoryStore},
    transfer,
};

use errors::CoreError;

pub use wishlist_tracker::WishListTracker;

/// Top-level keys an asset import must carry.
pub const ASSET_IMPORT_KEYS: [&str; 3] = ["currentAssets", "snapshots", "settings"];

/// Main entry point for the asset side of the library.
/// Holds the persisted asset data and all services needed to operate on it.
///
/// Every successful mutation is written back to the store before returning.
#[must_use]
pub struct AssetTracker {
    storage: LocalStorage<AppData>,
    asset_service: AssetService,
    analytics_service: AnalyticsService,
    quote_service: QuoteService,
}

impl std::fmt::Debug for AssetTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.storage.get();
        f.debug_struct("AssetTracker")
            .field("assets", &data.current_assets.assets.len())
            .field("snapshots", &data.snapshots.len())
            .field("exchange_rate", &data.current_assets.exchange_rate)
            .field("settings", &data.settings)
            .finish()
    }
}

impl AssetTracker {
    /// Load the asset blob from `store` (or start empty) and wire up services.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let storage: LocalStorage<AppData> = LocalStorage::load(store, ASSET_DATA_KEY);
        let registry = QuoteProviderRegistry::from_config(&storage.get().settings.data_source);
        Self {
            storage,
            asset_service: AssetService::new(),
            analytics_service: AnalyticsService::new(),
            quote_service: QuoteService::new(registry),
        }
    }

    /// Fresh tracker backed by an in-memory store.
    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    /// Load from a directory of JSON files (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_dir(dir: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let store = storage::store::FileStore::open(dir)?;
        Ok(Self::open(Arc::new(store)))
    }

    /// Replace the quote providers built from settings.
    pub fn with_quote_registry(mut self, registry: QuoteProviderRegistry) -> Self {
        self.quote_service = QuoteService::new(registry);
        self
    }

    /// The whole persisted container.
    #[must_use]
    pub fn data(&self) -> &AppData {
        self.storage.get()
    }

    // ── Asset Management ────────────────────────────────────────────

    /// Add an asset to the live list. Returns its id.
    pub fn add_asset(&mut self, asset: Asset) -> Result<String, CoreError> {
        let service = &self.asset_service;
        self.storage
            .update(|data| service.add_asset(data, asset, Utc::now()))
    }

    /// Update an asset. If the snapshot interval has elapsed, a snapshot of
    /// the pre-update list is recorded first; its id is returned.
    pub fn update_asset(
        &mut self,
        asset_id: &str,
        update: AssetUpdate,
    ) -> Result<Option<String>, CoreError> {
        let service = &self.asset_service;
        self.storage
            .update(|data| service.update_asset(data, asset_id, update, Utc::now()))
    }

    /// Remove an asset by its id and return it.
    pub fn delete_asset(&mut self, asset_id: &str) -> Result<Asset, CoreError> {
        let service = &self.asset_service;
        self.storage
            .update(|data| service.delete_asset(data, asset_id, Utc::now()))
    }

    #[must_use]
    pub fn get_asset(&self, asset_id: &str) -> Option<&Asset> {
        self.data()
            .current_assets
            .assets
            .iter()
            .find(|a| a.id == asset_id)
    }

    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.data().current_assets.assets
    }

    #[must_use]
    pub fn assets_by_type(&self, asset_type: AssetType) -> Vec<&Asset> {
        self.assets()
            .iter()
            .filter(|a| a.asset_type == asset_type)
            .collect()
    }

    /// Current TWD per USD.
    #[must_use]
    pub fn exchange_rate(&self) -> f64 {
        self.data().current_assets.exchange_rate
    }

    pub fn set_exchange_rate(&mut self, rate: f64) -> Result<(), CoreError> {
        let service = &self.asset_service;
        self.storage
            .update(|data| service.set_exchange_rate(data, rate, Utc::now()))
    }

    /// Net worth of the live list in `currency` at the current rate.
    #[must_use]
    pub fn total_value(&self, currency: Currency) -> f64 {
        currency_service::total_value(self.assets(), currency, self.exchange_rate())
    }

    // ── Snapshots ───────────────────────────────────────────────────

    /// Record a snapshot of the live list now. Returns its id.
    pub fn create_snapshot(&mut self, notes: Option<String>) -> Result<String, CoreError> {
        let service = &self.asset_service;
        let id = self
            .storage
            .update(|data| service.take_snapshot(data, notes, Utc::now()))?;
        info!("Recorded snapshot {id}");
        Ok(id)
    }

    pub fn delete_snapshot(&mut self, snapshot_id: &str) -> Result<Snapshot, CoreError> {
        let service = &self.asset_service;
        self.storage
            .update(|data| service.delete_snapshot(data, snapshot_id))
    }

    pub fn set_snapshot_notes(
        &mut self,
        snapshot_id: &str,
        notes: Option<String>,
    ) -> Result<(), CoreError> {
        let service = &self.asset_service;
        self.storage
            .update(|data| service.set_snapshot_notes(data, snapshot_id, notes))
    }

    /// Snapshot history, oldest first.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.data().snapshots
    }

    #[must_use]
    pub fn get_snapshot(&self, snapshot_id: &str) -> Option<&Snapshot> {
        self.snapshots().iter().find(|s| s.id == snapshot_id)
    }

    #[must_use]
    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.data().latest_snapshot()
    }

    /// Whether the configured snapshot interval has elapsed.
    #[must_use]
    pub fn is_snapshot_due(&self) -> bool {
        is_snapshot_needed(
            self.latest_snapshot().map(|s| s.date),
            self.data().settings.snapshot_interval,
        )
    }

    // ── Analytics ───────────────────────────────────────────────────

    /// Totals and allocation vs target of the live list.
    #[must_use]
    pub fn summary(&self) -> PortfolioSummary {
        let data = self.data();
        self.analytics_service
            .get_portfolio_summary(&data.current_assets, &data.settings)
    }

    /// Growth attribution between two recorded snapshots.
    pub fn analyze_growth(
        &self,
        start_snapshot_id: &str,
        end_snapshot_id: &str,
        currency: Currency,
    ) -> Result<GrowthAnalysis, CoreError> {
        let start = self
            .get_snapshot(start_snapshot_id)
            .ok_or_else(|| CoreError::SnapshotNotFound(start_snapshot_id.to_string()))?;
        let end = self
            .get_snapshot(end_snapshot_id)
            .ok_or_else(|| CoreError::SnapshotNotFound(end_snapshot_id.to_string()))?;
        Ok(growth_service::analyze_growth_between_snapshots(
            start, end, currency,
        ))
    }

    /// Growth attribution from the latest snapshot to the live list.
    /// `None` when no snapshot exists yet.
    pub fn analyze_growth_since_latest(
        &self,
        currency: Currency,
    ) -> Result<Option<GrowthAnalysis>, CoreError> {
        let Some(latest) = self.latest_snapshot() else {
            return Ok(None);
        };
        let live = create_snapshot(self.assets(), self.exchange_rate(), Utc::now(), None)?;
        Ok(Some(growth_service::analyze_growth_between_snapshots(
            latest, &live, currency,
        )))
    }

    /// Growth attribution for every consecutive snapshot pair.
    #[must_use]
    pub fn analyze_growth_sources(&self, currency: Currency) -> GrowthSourcesReport {
        growth_service::analyze_growth_sources(self.snapshots(), currency)
    }

    /// Snapshot totals with a trailing moving average over `ma_window` points.
    #[must_use]
    pub fn growth_chart(&self, currency: Currency, ma_window: usize) -> Vec<ChartDataPoint> {
        chart_service::generate_growth_chart(self.snapshots(), currency, ma_window)
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Re-price every stock holding from the quote providers.
    ///
    /// Per-symbol failures are logged and reported, never propagated; only
    /// a failed write to the store is an error.
    pub async fn refresh_prices(&mut self) -> Result<RefreshReport, CoreError> {
        let rate = self.exchange_rate();
        let mut report = RefreshReport::default();
        let mut prices = Vec::new();

        for asset in self.assets().iter().filter(|a| a.asset_type.is_stock()) {
            let Some(symbol) = asset.symbol.as_deref().filter(|s| !s.is_empty()) else {
                report.skipped.push(asset.id.clone());
                continue;
            };
            if asset.shares.is_none() {
                report.skipped.push(asset.id.clone());
                continue;
            }

            match self
                .quote_service
                .try_fetch_stock_quote(symbol, asset.asset_type)
                .await
            {
                Ok(quote) => {
                    let price = match quote.currency.parse::<Currency>() {
                        Ok(quoted) => currency_service::convert(quote.price, quoted, asset.currency, rate),
                        Err(_) => {
                            warn!(
                                "Quote for {symbol} is in {}, assuming {}",
                                quote.currency, asset.currency
                            );
                            quote.price
                        }
                    };
                    prices.push((asset.id.clone(), price));
                }
                Err(e) => {
                    warn!("Price refresh failed for {symbol}: {e}");
                    report.failed.push((asset.id.clone(), e.to_string()));
                }
            }
        }

        if !prices.is_empty() {
            let service = &self.asset_service;
            let (updated, rejected) = self.storage.update(|data| {
                let now = Utc::now();
                let mut updated = Vec::with_capacity(prices.len());
                let mut rejected = Vec::new();
                for (id, price) in &prices {
                    match service.apply_price(data, id, *price, now) {
                        Ok(_) => updated.push(id.clone()),
                        Err(e) => {
                            warn!("Could not apply refreshed price to {id}: {e}");
                            rejected.push((id.clone(), e.to_string()));
                        }
                    }
                }
                Ok((updated, rejected))
            })?;
            report.updated = updated;
            report.failed.extend(rejected);
        }

        info!(
            "Price refresh: {} updated, {} failed, {} skipped",
            report.updated.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Fetch and store the current USD/TWD rate.
    /// Returns `None` (rate unchanged) when no provider answered.
    pub async fn refresh_exchange_rate(&mut self) -> Result<Option<f64>, CoreError> {
        match self.quote_service.fetch_exchange_rate().await {
            Some(rate) => {
                self.set_exchange_rate(rate)?;
                Ok(Some(rate))
            }
            None => Ok(None),
        }
    }

    // ── Provider Availability ───────────────────────────────────────

    #[must_use]
    pub fn is_provider_available(&self, asset_type: &AssetType) -> bool {
        self.quote_service.has_provider_for(asset_type)
    }

    #[must_use]
    pub fn get_provider_names(&self, asset_type: &AssetType) -> Vec<String> {
        self.quote_service.get_provider_names(asset_type)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &AppSettings {
        &self.data().settings
    }

    /// Replace the settings after validation.
    /// Rebuilds the quote providers so data-source changes take effect immediately.
    pub fn update_settings(&mut self, settings: AppSettings) -> Result<(), CoreError> {
        self.asset_service.validate_settings(&settings)?;
        let registry = QuoteProviderRegistry::from_config(&settings.data_source);
        self.storage.update(|data| {
            data.settings = settings;
            Ok(())
        })?;
        self.quote_service = QuoteService::new(registry);
        Ok(())
    }

    /// Set an API key for a provider (e.g., "alphavantage").
    pub fn set_api_key(&mut self, provider: String, key: String) -> Result<(), CoreError> {
        let mut settings = self.get_settings().clone();
        settings.data_source.api_keys.insert(provider, key);
        self.update_settings(settings)
    }

    /// Remove an API key for a provider. Returns whether a key was removed.
    pub fn remove_api_key(&mut self, provider: &str) -> Result<bool, CoreError> {
        let mut settings = self.get_settings().clone();
        if settings.data_source.api_keys.remove(provider).is_none() {
            return Ok(false);
        }
        self.update_settings(settings)?;
        Ok(true)
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the whole asset blob as pretty JSON.
    pub fn export_data(&self) -> Result<String, CoreError> {
        transfer::export_json(self.data())
    }

    /// Replace all asset data with an exported blob.
    pub fn import_data(&mut self, json: &str) -> Result<(), CoreError> {
        let imported: AppData = transfer::import_json(json, &ASSET_IMPORT_KEYS)?;
        let registry = QuoteProviderRegistry::from_config(&imported.settings.data_source);
        info!(
            "Importing {} assets and {} snapshots",
            imported.current_assets.assets.len(),
            imported.snapshots.len()
        );
        self.storage.set(imported)?;
        self.quote_service = QuoteService::new(registry);
        Ok(())
    }

    /// Delete all asset data and start over with defaults.
    pub fn reset(&mut self) -> Result<(), CoreError> {
        self.storage.clear()?;
        self.quote_service =
            QuoteService::new(QuoteProviderRegistry::from_config(&self.data().settings.data_source));
        Ok(())
    }
}
