use std::collections::BTreeMap;

use crate::models::analytics::{AllocationEntry, PortfolioSummary};
use crate::models::app_data::CurrentAssets;
use crate::models::asset::{AssetType, Currency};
use crate::models::settings::AppSettings;

use super::currency_service::{to_twd, total_value};

/// Computes totals and allocation breakdown of the live asset list.
///
/// Pure business logic over already-valued assets. No I/O.
pub struct AnalyticsService;

impl AnalyticsService {
    pub fn new() -> Self {
        Self
    }

    /// Net worth, gross assets, liabilities and per-type allocation.
    ///
    /// Allocation percentages are shares of gross assets so liabilities do
    /// not distort them; the liability row reports its share of the same base.
    /// Types with a target but no holdings still get a row.
    pub fn get_portfolio_summary(
        &self,
        current: &CurrentAssets,
        settings: &AppSettings,
    ) -> PortfolioSummary {
        let rate = current.exchange_rate;
        let by_type = self.value_by_type(current);

        let total_liabilities = by_type
            .get(&AssetType::Liability)
            .copied()
            .unwrap_or(0.0);
        let total_assets: f64 = by_type
            .iter()
            .filter(|(t, _)| !t.is_liability())
            .map(|(_, v)| v)
            .sum();

        let allocations = AssetType::ALL
            .iter()
            .filter(|t| by_type.contains_key(*t) || settings.target_allocation.contains_key(*t))
            .map(|t| {
                let value = by_type.get(t).copied().unwrap_or(0.0);
                let percentage = if total_assets > 0.0 {
                    value / total_assets * 100.0
                } else {
                    0.0
                };
                let target_percentage = settings.target_allocation.get(t).copied();
                AllocationEntry {
                    asset_type: *t,
                    value,
                    percentage,
                    target_percentage,
                    difference: target_percentage.map(|target| percentage - target),
                }
            })
            .collect();

        PortfolioSummary {
            total_value_twd: total_value(&current.assets, Currency::Twd, rate),
            total_value_usd: total_value(&current.assets, Currency::Usd, rate),
            total_assets,
            total_liabilities,
            exchange_rate: rate,
            asset_count: current.assets.len(),
            allocations,
        }
    }

    /// Unsigned TWD value held per asset type.
    pub fn value_by_type(&self, current: &CurrentAssets) -> BTreeMap<AssetType, f64> {
        let mut by_type = BTreeMap::new();
        for asset in &current.assets {
            *by_type.entry(asset.asset_type).or_insert(0.0) +=
                to_twd(asset.value, asset.currency, current.exchange_rate);
        }
        by_type
    }
}

impl Default for AnalyticsService {
    fn default() -> Self {
        Self::new()
    }
}
