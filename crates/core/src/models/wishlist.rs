use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::Currency;

/// Storage key of the wish-list blob.
pub const WISHLIST_DATA_KEY: &str = "wishlist-data";

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 10;
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Lifecycle state of a wish item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WishStatus {
    Wishlist,
    Purchased,
    Rejected,
}

impl std::fmt::Display for WishStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WishStatus::Wishlist => write!(f, "wishlist"),
            WishStatus::Purchased => write!(f, "purchased"),
            WishStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// One entry of an item's want-intensity history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntensityRecord {
    pub date: DateTime<Utc>,
    pub intensity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Something the user is considering buying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub currency: Currency,
    pub category: String,
    pub priority: Priority,

    /// Current want intensity, 1 (meh) to 10 (must have)
    pub want_intensity: u8,

    #[serde(default)]
    pub intensity_history: Vec<IntensityRecord>,

    pub status: WishStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
}

impl WishItem {
    /// New item on the wish list. The initial intensity is recorded in the history.
    pub fn new(
        name: impl Into<String>,
        price: f64,
        currency: Currency,
        category: impl Into<String>,
        want_intensity: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            price,
            currency,
            category: category.into(),
            priority: Priority::Medium,
            want_intensity,
            intensity_history: vec![IntensityRecord {
                date: now,
                intensity: want_intensity,
                note: None,
            }],
            status: WishStatus::Wishlist,
            created_at: now,
            updated_at: now,
            url: None,
            notes: None,
            rejected_reason: None,
            rejected_at: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Partial update of a wish item. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishItemUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<Currency>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionRating {
    pub date: DateTime<Utc>,
    /// 1 (regret) to 5 (delighted)
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A wish item that was bought, with post-purchase satisfaction tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasedItem {
    pub id: String,
    pub wish_item_id: String,
    pub name: String,

    /// Price actually paid
    pub price: f64,
    pub currency: Currency,
    pub category: String,
    pub purchase_date: DateTime<Utc>,

    #[serde(default)]
    pub satisfaction_ratings: Vec<SatisfactionRating>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PurchasedItem {
    pub fn average_rating(&self) -> Option<f64> {
        if self.satisfaction_ratings.is_empty() {
            return None;
        }
        let sum: u32 = self
            .satisfaction_ratings
            .iter()
            .map(|r| u32::from(r.rating))
            .sum();
        Some(f64::from(sum) / self.satisfaction_ratings.len() as f64)
    }

    pub fn latest_rating(&self) -> Option<u8> {
        self.satisfaction_ratings
            .iter()
            .max_by_key(|r| r.date)
            .map(|r| r.rating)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishListSettings {
    /// Spending allowance per calendar month, in `budget_currency`
    pub monthly_budget: f64,
    pub budget_currency: Currency,

    /// Warn when the open wish list exceeds this share of total assets (percent)
    pub max_asset_percentage: f64,
}

impl Default for WishListSettings {
    fn default() -> Self {
        Self {
            monthly_budget: 10_000.0,
            budget_currency: Currency::Twd,
            max_asset_percentage: 5.0,
        }
    }
}

/// Wish-list container, persisted under [`WISHLIST_DATA_KEY`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishListData {
    /// Every wish item, whatever its status
    pub items: Vec<WishItem>,
    pub purchased: Vec<PurchasedItem>,
    #[serde(default)]
    pub settings: WishListSettings,
}
