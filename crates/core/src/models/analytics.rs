use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::{AssetType, Currency};

/// Decomposition of the change in total value between two snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthAnalysis {
    /// end total - start total, in the analysis currency
    pub total_growth: f64,

    /// Deposits, withdrawals and share purchases/sales at transaction price
    pub new_capital: f64,

    /// Price movement on holdings whose quantity did not change
    pub investment_returns: f64,

    pub new_capital_percentage: f64,

    pub investment_returns_percentage: f64,
}

/// Growth analysis of one snapshot-to-snapshot period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodGrowth {
    pub start_snapshot_id: String,
    pub end_snapshot_id: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub analysis: GrowthAnalysis,
}

/// Growth sources across a whole snapshot history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSourcesReport {
    pub currency: Currency,

    /// One entry per consecutive snapshot pair, oldest first
    pub periods: Vec<PeriodGrowth>,

    /// Components summed over every period
    pub cumulative: GrowthAnalysis,
}

/// Actual vs target share of one asset type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationEntry {
    pub asset_type: AssetType,

    /// Total value of this type, in TWD
    pub value: f64,

    /// Share of gross assets (liabilities excluded), percent
    pub percentage: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_percentage: Option<f64>,

    /// percentage - target_percentage; positive means overweight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difference: Option<f64>,
}

/// Snapshot of the live asset list's totals and allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    /// Net worth in TWD (liabilities subtracted)
    #[serde(rename = "totalValueTWD")]
    pub total_value_twd: f64,

    #[serde(rename = "totalValueUSD")]
    pub total_value_usd: f64,

    /// Gross assets in TWD
    pub total_assets: f64,

    /// Outstanding liabilities in TWD, as a positive number
    pub total_liabilities: f64,

    pub exchange_rate: f64,

    pub asset_count: usize,

    /// One entry per asset type present or targeted, in display order
    pub allocations: Vec<AllocationEntry>,
}

/// Wish-list spending vs budget and total assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub currency: Currency,

    /// Price of every item still on the wish list
    pub total_wish_value: f64,

    /// total_wish_value as a share of total assets, percent
    pub percentage_of_assets: f64,

    /// True when percentage_of_assets exceeds the configured ceiling
    pub exceeds_asset_limit: bool,

    pub spent_this_month: f64,
    pub monthly_budget: f64,
    pub remaining_budget: f64,
    pub over_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSatisfaction {
    pub purchased_item_id: String,
    pub name: String,
    pub average_rating: Option<f64>,
    pub latest_rating: Option<u8>,
    pub rating_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SatisfactionSummary {
    /// Mean of the per-item averages, over rated items only
    pub overall_average: Option<f64>,
    pub rated_items: usize,
    pub unrated_items: usize,
    pub items: Vec<ItemSatisfaction>,
}
