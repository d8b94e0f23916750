use std::collections::BTreeMap;

use log::debug;

use crate::models::analytics::{GrowthAnalysis, GrowthSourcesReport, PeriodGrowth};
use crate::models::asset::{Asset, Currency};
use crate::models::snapshot::Snapshot;

use super::currency_service::{asset_value_in, convert};
use super::snapshot_service::sorted_by_date;

/// Largest gap tolerated between `new_capital + investment_returns` and
/// `total_growth` before returns are forced to close it.
pub const RECONCILIATION_TOLERANCE: f64 = 1.0;

/// Below this absolute total growth, percentages are taken relative to the
/// component magnitudes instead of the growth itself.
pub const ZERO_GROWTH_EPSILON: f64 = 0.01;

const SHARE_EPSILON: f64 = 1e-9;

/// Split the change in total value between two snapshots into new capital
/// and investment returns.
///
/// This is a heuristic: with only two point-in-time captures and no
/// transaction history, share-count changes are priced at the end price and
/// every value change of cash-like holdings is treated as a deposit or
/// withdrawal. Each asset is converted at its own snapshot's exchange rate.
pub fn analyze_growth_between_snapshots(
    start: &Snapshot,
    end: &Snapshot,
    currency: Currency,
) -> GrowthAnalysis {
    let total_growth = end.total_in(currency) - start.total_in(currency);

    let start_index = index_by_key(&start.assets);
    let end_index = index_by_key(&end.assets);

    let mut new_capital = 0.0;
    let mut investment_returns = 0.0;

    for (key, end_asset) in &end_index {
        let end_value = asset_value_in(end_asset, currency, end.exchange_rate);

        let Some(start_asset) = start_index.get(key) else {
            // Freshly added holding
            new_capital += end_value;
            continue;
        };

        let start_value = asset_value_in(start_asset, currency, start.exchange_rate);
        let delta = end_value - start_value;

        if end_asset.asset_type.is_stock() {
            match shares_bought(start_asset, end_asset) {
                Some((shares_diff, end_shares)) if end_shares > SHARE_EPSILON => {
                    let price_per_share = end_asset.value / end_shares;
                    let converted_price = convert(
                        price_per_share,
                        end_asset.currency,
                        currency,
                        end.exchange_rate,
                    );
                    let traded = shares_diff * converted_price;
                    new_capital += traded;
                    investment_returns += delta - traded;
                }
                // Position fully closed: the whole change left as cash.
                Some(_) => new_capital += delta,
                None => investment_returns += delta,
            }
        } else if end_asset.asset_type.is_liability() {
            let balance_delta = convert(
                end_asset.value,
                end_asset.currency,
                currency,
                end.exchange_rate,
            ) - convert(
                start_asset.value,
                start_asset.currency,
                currency,
                start.exchange_rate,
            );
            new_capital -= balance_delta;
        } else {
            new_capital += delta;
        }
    }

    // Liquidated holdings count as withdrawals.
    for (key, start_asset) in &start_index {
        if !end_index.contains_key(key) {
            new_capital -= asset_value_in(start_asset, currency, start.exchange_rate);
        }
    }

    let drift = new_capital + investment_returns - total_growth;
    if drift.abs() > RECONCILIATION_TOLERANCE {
        debug!(
            "Growth attribution drifted by {drift:.2} {currency} between snapshots {} and {}; \
             forcing investment returns to reconcile",
            start.id, end.id
        );
        investment_returns = total_growth - new_capital;
    }

    with_percentages(total_growth, new_capital, investment_returns)
}

/// Run [`analyze_growth_between_snapshots`] over every consecutive pair of
/// snapshots (ordered by date) and sum the results.
///
/// Fewer than two snapshots yields no periods and an all-zero cumulative.
pub fn analyze_growth_sources(snapshots: &[Snapshot], currency: Currency) -> GrowthSourcesReport {
    let sorted = sorted_by_date(snapshots);

    let periods: Vec<PeriodGrowth> = sorted
        .windows(2)
        .map(|pair| {
            let (start, end) = (pair[0], pair[1]);
            PeriodGrowth {
                start_snapshot_id: start.id.clone(),
                end_snapshot_id: end.id.clone(),
                start_date: start.date,
                end_date: end.date,
                analysis: analyze_growth_between_snapshots(start, end, currency),
            }
        })
        .collect();

    let (total_growth, new_capital, investment_returns) =
        periods.iter().fold((0.0, 0.0, 0.0), |(tg, nc, ir), p| {
            (
                tg + p.analysis.total_growth,
                nc + p.analysis.new_capital,
                ir + p.analysis.investment_returns,
            )
        });

    GrowthSourcesReport {
        currency,
        periods,
        cumulative: with_percentages(total_growth, new_capital, investment_returns),
    }
}

/// Attach component percentages to the three growth figures.
fn with_percentages(total_growth: f64, new_capital: f64, investment_returns: f64) -> GrowthAnalysis {
    let (new_capital_percentage, investment_returns_percentage) =
        if total_growth.abs() > ZERO_GROWTH_EPSILON {
            let base = total_growth.abs();
            let sign = if total_growth < 0.0 { -1.0 } else { 1.0 };
            (
                sign * new_capital / base * 100.0,
                sign * investment_returns / base * 100.0,
            )
        } else {
            let magnitude = new_capital.abs() + investment_returns.abs();
            if magnitude > 0.0 {
                (
                    new_capital / magnitude * 100.0,
                    investment_returns / magnitude * 100.0,
                )
            } else {
                (0.0, 0.0)
            }
        };

    GrowthAnalysis {
        total_growth,
        new_capital,
        investment_returns,
        new_capital_percentage,
        investment_returns_percentage,
    }
}

/// Later holdings win when two share a match key.
fn index_by_key(assets: &[Asset]) -> BTreeMap<&str, &Asset> {
    let mut index = BTreeMap::new();
    for asset in assets {
        if let Some(shadowed) = index.insert(asset.match_key(), asset) {
            debug!(
                "Holdings {} and {} share the match key '{}'; only {} is compared",
                shadowed.id,
                asset.id,
                asset.match_key(),
                asset.id
            );
        }
    }
    index
}

/// `(end - start, end)` share counts when both are known and differ.
/// `None` means the share count is unchanged or unknown.
fn shares_bought(start: &Asset, end: &Asset) -> Option<(f64, f64)> {
    let (start_shares, end_shares) = (start.shares?, end.shares?);
    let diff = end_shares - start_shares;
    (diff.abs() > SHARE_EPSILON).then_some((diff, end_shares))
}
