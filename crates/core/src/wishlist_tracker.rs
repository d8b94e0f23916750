use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;

use crate::errors::CoreError;
use crate::models::analytics::{BudgetSummary, SatisfactionSummary};
use crate::models::wishlist::{
    PurchasedItem, WishItem, WishItemUpdate, WishListData, WishListSettings, WISHLIST_DATA_KEY,
};
use crate::services::wishlist_service::WishListService;
use crate::storage::{
    local::LocalStorage,
    store::{KeyValueStore, MemoryStore},
    transfer,
};

/// Top-level keys a wish-list import must carry.
pub const WISHLIST_IMPORT_KEYS: [&str; 2] = ["items", "purchased"];

/// Entry point for the wish list: items, purchases, ratings and budget.
///
/// Stored under its own key, independent of the asset data.
#[must_use]
pub struct WishListTracker {
    storage: LocalStorage<WishListData>,
    service: WishListService,
}

impl std::fmt::Debug for WishListTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let data = self.storage.get();
        f.debug_struct("WishListTracker")
            .field("items", &data.items.len())
            .field("purchased", &data.purchased.len())
            .field("settings", &data.settings)
            .finish()
    }
}

impl WishListTracker {
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage: LocalStorage::load(store, WISHLIST_DATA_KEY),
            service: WishListService::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::open(Arc::new(MemoryStore::new()))
    }

    #[must_use]
    pub fn data(&self) -> &WishListData {
        self.storage.get()
    }

    // ── Items ───────────────────────────────────────────────────────

    pub fn add_item(&mut self, item: WishItem) -> Result<String, CoreError> {
        let service = &self.service;
        self.storage.update(|data| service.add_item(data, item))
    }

    pub fn update_item(&mut self, item_id: &str, update: WishItemUpdate) -> Result<(), CoreError> {
        let service = &self.service;
        self.storage
            .update(|data| service.update_item(data, item_id, update, Utc::now()))
    }

    pub fn delete_item(&mut self, item_id: &str) -> Result<WishItem, CoreError> {
        let service = &self.service;
        self.storage.update(|data| service.delete_item(data, item_id))
    }

    #[must_use]
    pub fn get_item(&self, item_id: &str) -> Option<&WishItem> {
        self.data().items.iter().find(|i| i.id == item_id)
    }

    /// Record how much the item is wanted today (1-10).
    pub fn record_intensity(
        &mut self,
        item_id: &str,
        intensity: u8,
        note: Option<String>,
    ) -> Result<(), CoreError> {
        let service = &self.service;
        self.storage
            .update(|data| service.record_intensity(data, item_id, intensity, note, Utc::now()))
    }

    /// Items still wanted, highest priority first.
    #[must_use]
    pub fn active_items(&self) -> Vec<&WishItem> {
        self.service.active_items(self.data())
    }

    #[must_use]
    pub fn rejected_items(&self) -> Vec<&WishItem> {
        self.service.rejected_items(self.data())
    }

    // ── Decisions ───────────────────────────────────────────────────

    /// Buy an item. Returns the id of the new purchase record.
    pub fn mark_purchased(
        &mut self,
        item_id: &str,
        price: f64,
        purchase_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<String, CoreError> {
        let service = &self.service;
        let id = self
            .storage
            .update(|data| service.mark_purchased(data, item_id, price, purchase_date, notes))?;
        info!("Wish item {item_id} purchased as {id}");
        Ok(id)
    }

    pub fn reject_item(&mut self, item_id: &str, reason: Option<String>) -> Result<(), CoreError> {
        let service = &self.service;
        self.storage
            .update(|data| service.reject_item(data, item_id, reason, Utc::now()))
    }

    pub fn restore_item(&mut self, item_id: &str) -> Result<(), CoreError> {
        let service = &self.service;
        self.storage
            .update(|data| service.restore_item(data, item_id, Utc::now()))
    }

    // ── Purchases ───────────────────────────────────────────────────

    #[must_use]
    pub fn purchased_items(&self) -> &[PurchasedItem] {
        &self.data().purchased
    }

    pub fn add_satisfaction_rating(
        &mut self,
        purchased_id: &str,
        rating: u8,
        note: Option<String>,
    ) -> Result<(), CoreError> {
        let service = &self.service;
        self.storage.update(|data| {
            service.add_satisfaction_rating(data, purchased_id, rating, note, Utc::now())
        })
    }

    pub fn delete_purchased(&mut self, purchased_id: &str) -> Result<PurchasedItem, CoreError> {
        let service = &self.service;
        self.storage
            .update(|data| service.delete_purchased(data, purchased_id, Utc::now()))
    }

    // ── Summaries ───────────────────────────────────────────────────

    /// Budget figures for the month containing `today`.
    /// `total_assets_twd` is net worth in TWD, e.g. from `AssetTracker::total_value`.
    #[must_use]
    pub fn budget_summary(
        &self,
        total_assets_twd: f64,
        exchange_rate: f64,
        today: DateTime<Utc>,
    ) -> BudgetSummary {
        self.service
            .budget_summary(self.data(), total_assets_twd, exchange_rate, today)
    }

    #[must_use]
    pub fn satisfaction_summary(&self) -> SatisfactionSummary {
        self.service.satisfaction_summary(self.data())
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn get_settings(&self) -> &WishListSettings {
        &self.data().settings
    }

    pub fn update_settings(&mut self, settings: WishListSettings) -> Result<(), CoreError> {
        self.service.validate_settings(&settings)?;
        self.storage.update(|data| {
            data.settings = settings;
            Ok(())
        })
    }

    // ── Export / Import ─────────────────────────────────────────────

    pub fn export_data(&self) -> Result<String, CoreError> {
        transfer::export_json(self.data())
    }

    /// Replace all wish-list data with an exported blob.
    pub fn import_data(&mut self, json: &str) -> Result<(), CoreError> {
        let imported: WishListData = transfer::import_json(json, &WISHLIST_IMPORT_KEYS)?;
        info!(
            "Importing {} wish items and {} purchases",
            imported.items.len(),
            imported.purchased.len()
        );
        self.storage.set(imported)
    }

    pub fn reset(&mut self) -> Result<(), CoreError> {
        self.storage.clear()
    }
}
