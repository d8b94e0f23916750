use crate::models::asset::Currency;
use crate::models::chart::ChartDataPoint;
use crate::models::snapshot::Snapshot;

use super::snapshot_service::sorted_by_date;

/// Trailing simple moving average.
///
/// Entry `i` averages `values[i + 1 - window ..= i]`; it is `None` until
/// `window` values are available. A zero window yields all `None`.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut result = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, value) in values.iter().enumerate() {
        running += value;
        if i >= window {
            running -= values[i - window];
        }
        if i + 1 >= window {
            result.push(Some(running / window as f64));
        } else {
            result.push(None);
        }
    }
    result
}

/// Percent change from `previous` to `current`; `None` when `previous` is zero.
pub fn growth_rate(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous.abs() * 100.0)
}

/// Generates chart-ready series from the snapshot history.
///
/// One point per snapshot, oldest first, carrying the snapshot's frozen total
/// in `currency`, the trailing moving average over `ma_window` points and the
/// period-over-period growth rate.
pub fn generate_growth_chart(
    snapshots: &[Snapshot],
    currency: Currency,
    ma_window: usize,
) -> Vec<ChartDataPoint> {
    let sorted = sorted_by_date(snapshots);
    let totals: Vec<f64> = sorted.iter().map(|s| s.total_in(currency)).collect();
    let averages = moving_average(&totals, ma_window);

    sorted
        .iter()
        .enumerate()
        .map(|(i, snapshot)| ChartDataPoint {
            date: snapshot.date,
            total_value: totals[i],
            moving_average: averages[i],
            growth_rate: if i == 0 {
                None
            } else {
                growth_rate(totals[i - 1], totals[i])
            },
        })
        .collect()
}
