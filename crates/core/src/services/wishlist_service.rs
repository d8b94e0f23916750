use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::analytics::{BudgetSummary, ItemSatisfaction, SatisfactionSummary};
use crate::models::asset::Currency;
use crate::models::wishlist::{
    IntensityRecord, PurchasedItem, SatisfactionRating, WishItem, WishItemUpdate, WishListData,
    WishListSettings, WishStatus, MAX_INTENSITY, MAX_RATING, MIN_INTENSITY, MIN_RATING,
};

use super::currency_service::convert;

/// Manages wish items through their lifecycle
/// (wishlist → purchased | rejected) plus budget and satisfaction figures.
///
/// Pure business logic over [`WishListData`]. No I/O.
pub struct WishListService;

impl WishListService {
    pub fn new() -> Self {
        Self
    }

    pub fn add_item(&self, data: &mut WishListData, item: WishItem) -> Result<String, CoreError> {
        self.validate_item(&item)?;
        if data.items.iter().any(|i| i.id == item.id) {
            return Err(CoreError::ValidationError(format!(
                "A wish item with id {} already exists",
                item.id
            )));
        }
        let id = item.id.clone();
        data.items.push(item);
        Ok(id)
    }

    pub fn update_item(
        &self,
        data: &mut WishListData,
        item_id: &str,
        update: WishItemUpdate,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let idx = self.item_position(data, item_id)?;
        let mut updated = data.items[idx].clone();

        if let Some(name) = update.name {
            updated.name = name;
        }
        if let Some(price) = update.price {
            updated.price = price;
        }
        if let Some(currency) = update.currency {
            updated.currency = currency;
        }
        if let Some(category) = update.category {
            updated.category = category;
        }
        if let Some(priority) = update.priority {
            updated.priority = priority;
        }
        if let Some(url) = update.url {
            updated.url = (!url.trim().is_empty()).then_some(url);
        }
        if let Some(notes) = update.notes {
            updated.notes = (!notes.trim().is_empty()).then_some(notes);
        }
        updated.updated_at = now;
        self.validate_item(&updated)?;

        data.items[idx] = updated;
        Ok(())
    }

    pub fn delete_item(&self, data: &mut WishListData, item_id: &str) -> Result<WishItem, CoreError> {
        let idx = self.item_position(data, item_id)?;
        Ok(data.items.remove(idx))
    }

    /// Set the current want intensity and append it to the item's history.
    pub fn record_intensity(
        &self,
        data: &mut WishListData,
        item_id: &str,
        intensity: u8,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        Self::validate_intensity(intensity)?;
        let idx = self.item_position(data, item_id)?;
        let item = &mut data.items[idx];
        Self::require_status(item, WishStatus::Wishlist)?;

        item.want_intensity = intensity;
        item.intensity_history.push(IntensityRecord {
            date: now,
            intensity,
            note: note.filter(|n| !n.trim().is_empty()),
        });
        item.updated_at = now;
        Ok(())
    }

    /// Move an item off the wish list into the purchased collection.
    /// `price` is what was actually paid, in the item's currency.
    pub fn mark_purchased(
        &self,
        data: &mut WishListData,
        item_id: &str,
        price: f64,
        purchase_date: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<String, CoreError> {
        Self::validate_price(price)?;
        let idx = self.item_position(data, item_id)?;
        let item = &mut data.items[idx];
        Self::require_status(item, WishStatus::Wishlist)?;

        item.status = WishStatus::Purchased;
        item.updated_at = purchase_date;

        let purchased = PurchasedItem {
            id: Uuid::new_v4().to_string(),
            wish_item_id: item.id.clone(),
            name: item.name.clone(),
            price,
            currency: item.currency,
            category: item.category.clone(),
            purchase_date,
            satisfaction_ratings: Vec::new(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        let id = purchased.id.clone();
        data.purchased.push(purchased);
        Ok(id)
    }

    /// Decide against buying an item. The item stays, marked rejected.
    pub fn reject_item(
        &self,
        data: &mut WishListData,
        item_id: &str,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let idx = self.item_position(data, item_id)?;
        let item = &mut data.items[idx];
        Self::require_status(item, WishStatus::Wishlist)?;

        item.status = WishStatus::Rejected;
        item.rejected_reason = reason.filter(|r| !r.trim().is_empty());
        item.rejected_at = Some(now);
        item.updated_at = now;
        Ok(())
    }

    /// Put a rejected item back on the wish list.
    pub fn restore_item(
        &self,
        data: &mut WishListData,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let idx = self.item_position(data, item_id)?;
        let item = &mut data.items[idx];
        Self::require_status(item, WishStatus::Rejected)?;

        item.status = WishStatus::Wishlist;
        item.rejected_reason = None;
        item.rejected_at = None;
        item.updated_at = now;
        Ok(())
    }

    pub fn add_satisfaction_rating(
        &self,
        data: &mut WishListData,
        purchased_id: &str,
        rating: u8,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(CoreError::ValidationError(format!(
                "Satisfaction rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
            )));
        }
        let purchased = data
            .purchased
            .iter_mut()
            .find(|p| p.id == purchased_id)
            .ok_or_else(|| CoreError::PurchasedItemNotFound(purchased_id.to_string()))?;

        purchased.satisfaction_ratings.push(SatisfactionRating {
            date: now,
            rating,
            note: note.filter(|n| !n.trim().is_empty()),
        });
        Ok(())
    }

    /// Delete a purchase record. The originating wish item, if still present,
    /// goes back to the wish list.
    pub fn delete_purchased(
        &self,
        data: &mut WishListData,
        purchased_id: &str,
        now: DateTime<Utc>,
    ) -> Result<PurchasedItem, CoreError> {
        let idx = data
            .purchased
            .iter()
            .position(|p| p.id == purchased_id)
            .ok_or_else(|| CoreError::PurchasedItemNotFound(purchased_id.to_string()))?;
        let removed = data.purchased.remove(idx);

        if let Some(item) = data
            .items
            .iter_mut()
            .find(|i| i.id == removed.wish_item_id && i.status == WishStatus::Purchased)
        {
            item.status = WishStatus::Wishlist;
            item.updated_at = now;
        }
        Ok(removed)
    }

    /// Items still on the wish list: highest priority first, then strongest want.
    pub fn active_items<'a>(&self, data: &'a WishListData) -> Vec<&'a WishItem> {
        let mut items: Vec<&WishItem> = data
            .items
            .iter()
            .filter(|i| i.status == WishStatus::Wishlist)
            .collect();
        items.sort_by(|a, b| {
            a.priority
                .cmp(&b.priority)
                .then(b.want_intensity.cmp(&a.want_intensity))
        });
        items
    }

    /// Rejected items, most recently rejected first.
    pub fn rejected_items<'a>(&self, data: &'a WishListData) -> Vec<&'a WishItem> {
        let mut items: Vec<&WishItem> = data
            .items
            .iter()
            .filter(|i| i.status == WishStatus::Rejected)
            .collect();
        items.sort_by(|a, b| b.rejected_at.cmp(&a.rejected_at));
        items
    }

    /// Wish-list spending against the monthly budget and against total assets.
    ///
    /// `total_assets` is expressed in TWD; `exchange_rate` is TWD per USD.
    /// All output figures are in the budget currency.
    pub fn budget_summary(
        &self,
        data: &WishListData,
        total_assets: f64,
        exchange_rate: f64,
        now: DateTime<Utc>,
    ) -> BudgetSummary {
        let settings: &WishListSettings = &data.settings;
        let target = settings.budget_currency;

        let total_wish_value: f64 = data
            .items
            .iter()
            .filter(|i| i.status == WishStatus::Wishlist)
            .map(|i| convert(i.price, i.currency, target, exchange_rate))
            .sum();

        let assets_in_target = convert(total_assets, Currency::Twd, target, exchange_rate);
        let percentage_of_assets = if assets_in_target > 0.0 {
            total_wish_value / assets_in_target * 100.0
        } else {
            0.0
        };

        let spent_this_month: f64 = data
            .purchased
            .iter()
            .filter(|p| {
                p.purchase_date.year() == now.year() && p.purchase_date.month() == now.month()
            })
            .map(|p| convert(p.price, p.currency, target, exchange_rate))
            .sum();

        let remaining_budget = settings.monthly_budget - spent_this_month;

        BudgetSummary {
            currency: target,
            total_wish_value,
            percentage_of_assets,
            exceeds_asset_limit: percentage_of_assets > settings.max_asset_percentage,
            spent_this_month,
            monthly_budget: settings.monthly_budget,
            remaining_budget,
            over_budget: remaining_budget < 0.0,
        }
    }

    pub fn satisfaction_summary(&self, data: &WishListData) -> SatisfactionSummary {
        let items: Vec<ItemSatisfaction> = data
            .purchased
            .iter()
            .map(|p| ItemSatisfaction {
                purchased_item_id: p.id.clone(),
                name: p.name.clone(),
                average_rating: p.average_rating(),
                latest_rating: p.latest_rating(),
                rating_count: p.satisfaction_ratings.len(),
            })
            .collect();

        let averages: Vec<f64> = items.iter().filter_map(|i| i.average_rating).collect();
        let overall_average = if averages.is_empty() {
            None
        } else {
            Some(averages.iter().sum::<f64>() / averages.len() as f64)
        };

        SatisfactionSummary {
            overall_average,
            rated_items: averages.len(),
            unrated_items: items.len() - averages.len(),
            items,
        }
    }

    pub fn validate_settings(&self, settings: &WishListSettings) -> Result<(), CoreError> {
        if !settings.monthly_budget.is_finite() || settings.monthly_budget < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Monthly budget must be finite and non-negative, got {}",
                settings.monthly_budget
            )));
        }
        if !settings.max_asset_percentage.is_finite()
            || !(0.0..=100.0).contains(&settings.max_asset_percentage)
        {
            return Err(CoreError::ValidationError(format!(
                "Maximum asset percentage must be between 0 and 100, got {}",
                settings.max_asset_percentage
            )));
        }
        Ok(())
    }

    fn validate_item(&self, item: &WishItem) -> Result<(), CoreError> {
        if item.name.trim().is_empty() {
            return Err(CoreError::ValidationError("Wish item name must not be empty".into()));
        }
        Self::validate_price(item.price)?;
        Self::validate_intensity(item.want_intensity)
    }

    fn validate_price(price: f64) -> Result<(), CoreError> {
        if !price.is_finite() || price < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Price must be finite and non-negative, got {price}"
            )));
        }
        Ok(())
    }

    fn validate_intensity(intensity: u8) -> Result<(), CoreError> {
        if !(MIN_INTENSITY..=MAX_INTENSITY).contains(&intensity) {
            return Err(CoreError::ValidationError(format!(
                "Want intensity must be between {MIN_INTENSITY} and {MAX_INTENSITY}, got {intensity}"
            )));
        }
        Ok(())
    }

    fn require_status(item: &WishItem, expected: WishStatus) -> Result<(), CoreError> {
        if item.status != expected {
            return Err(CoreError::ValidationError(format!(
                "Wish item '{}' is {}, expected {expected}",
                item.name, item.status
            )));
        }
        Ok(())
    }

    fn item_position(&self, data: &WishListData, item_id: &str) -> Result<usize, CoreError> {
        data.items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::WishItemNotFound(item_id.to_string()))
    }
}

impl Default for WishListService {
    fn default() -> Self {
        Self::new()
    }
}
