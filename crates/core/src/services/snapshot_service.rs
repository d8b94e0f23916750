use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::{Asset, Currency};
use crate::models::snapshot::Snapshot;

use super::currency_service::total_value;

/// Whether a new automatic snapshot is due.
///
/// True when there is no previous snapshot, or when at least `interval_days`
/// whole days have passed since it.
pub fn is_snapshot_needed(last_snapshot: Option<DateTime<Utc>>, interval_days: u32) -> bool {
    is_snapshot_needed_at(last_snapshot, interval_days, Utc::now())
}

/// [`is_snapshot_needed`] evaluated against an explicit `now`.
pub fn is_snapshot_needed_at(
    last_snapshot: Option<DateTime<Utc>>,
    interval_days: u32,
    now: DateTime<Utc>,
) -> bool {
    match last_snapshot {
        None => true,
        Some(last) => (now - last).num_days() >= i64::from(interval_days),
    }
}

/// Freeze `assets` into a snapshot taken at `date`.
///
/// Totals are computed here, once, with `exchange_rate`.
pub fn create_snapshot(
    assets: &[Asset],
    exchange_rate: f64,
    date: DateTime<Utc>,
    notes: Option<String>,
) -> Result<Snapshot, CoreError> {
    validate_exchange_rate(exchange_rate)?;

    let assets = assets.to_vec();
    let total_value_twd = total_value(&assets, Currency::Twd, exchange_rate);
    let total_value_usd = total_value(&assets, Currency::Usd, exchange_rate);

    Ok(Snapshot {
        id: Uuid::new_v4().to_string(),
        date,
        assets,
        total_value_twd,
        total_value_usd,
        exchange_rate,
        notes: notes.filter(|n| !n.trim().is_empty()),
    })
}

/// Snapshots ordered oldest first.
pub fn sorted_by_date(snapshots: &[Snapshot]) -> Vec<&Snapshot> {
    let mut sorted: Vec<&Snapshot> = snapshots.iter().collect();
    sorted.sort_by_key(|s| s.date);
    sorted
}

pub(crate) fn validate_exchange_rate(rate: f64) -> Result<(), CoreError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(CoreError::ValidationError(format!(
            "Exchange rate must be a positive number, got {rate}"
        )));
    }
    Ok(())
}
