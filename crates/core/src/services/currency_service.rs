//! Currency conversion between TWD and USD.
//!
//! `rate` is always TWD per USD. No rounding is applied and a zero rate is
//! not guarded: `to_usd` then yields an infinite value.

use crate::models::asset::{Asset, Currency};

/// Convert `value` held in `currency` to TWD.
pub fn to_twd(value: f64, currency: Currency, rate: f64) -> f64 {
    match currency {
        Currency::Twd => value,
        Currency::Usd => value * rate,
    }
}

/// Convert `value` held in `currency` to USD.
pub fn to_usd(value: f64, currency: Currency, rate: f64) -> f64 {
    match currency {
        Currency::Usd => value,
        Currency::Twd => value / rate,
    }
}

/// Convert `value` from `from` into `target`.
pub fn convert(value: f64, from: Currency, target: Currency, rate: f64) -> f64 {
    match target {
        Currency::Twd => to_twd(value, from, rate),
        Currency::Usd => to_usd(value, from, rate),
    }
}

/// Signed value of one asset in `target` (liabilities count negative).
pub fn asset_value_in(asset: &Asset, target: Currency, rate: f64) -> f64 {
    convert(asset.signed_value(), asset.currency, target, rate)
}

/// Net worth of `assets` in `target`: the signed sum of every converted value.
pub fn total_value(assets: &[Asset], target: Currency, rate: f64) -> f64 {
    assets
        .iter()
        .map(|a| asset_value_in(a, target, rate))
        .sum()
}
