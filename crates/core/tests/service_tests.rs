// ═══════════════════════════════════════════════════════════════════
// Service Tests — currency conversion, snapshots, growth attribution,
// charts, analytics, AssetService
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, Duration, TimeZone, Utc};

use asset_tracker_core::errors::CoreError;
use asset_tracker_core::models::app_data::AppData;
use asset_tracker_core::models::asset::{Asset, AssetType, AssetUpdate, Currency};
use asset_tracker_core::models::settings::AppSettings;
use asset_tracker_core::models::snapshot::Snapshot;
use asset_tracker_core::services::analytics_service::AnalyticsService;
use asset_tracker_core::services::asset_service::AssetService;
use asset_tracker_core::services::chart_service::{
    generate_growth_chart, growth_rate, moving_average,
};
use asset_tracker_core::services::currency_service::{
    asset_value_in, convert, to_twd, to_usd, total_value,
};
use asset_tracker_core::services::growth_service::{
    analyze_growth_between_snapshots, analyze_growth_sources,
};
use asset_tracker_core::services::snapshot_service::{
    create_snapshot, is_snapshot_needed, is_snapshot_needed_at, sorted_by_date,
};

// ═══════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════

fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn snap(assets: &[Asset], rate: f64, date: DateTime<Utc>) -> Snapshot {
    create_snapshot(assets, rate, date, None).unwrap()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ═══════════════════════════════════════════════════════════════════
// Currency conversion
// ═══════════════════════════════════════════════════════════════════

mod currency {
    use super::*;

    #[test]
    fn to_twd_converts_usd_only() {
        assert_eq!(to_twd(100.0, Currency::Usd, 31.5), 3_150.0);
        assert_eq!(to_twd(100.0, Currency::Twd, 31.5), 100.0);
    }

    #[test]
    fn to_usd_converts_twd_only() {
        assert_eq!(to_usd(3_150.0, Currency::Twd, 31.5), 100.0);
        assert_eq!(to_usd(100.0, Currency::Usd, 31.5), 100.0);
    }

    #[test]
    fn round_trip_preserves_value() {
        for value in [0.0, 1.0, 123.45, 9_876_543.21] {
            for rate in [28.0, 31.5, 32.77] {
                let back = to_usd(to_twd(value, Currency::Usd, rate), Currency::Twd, rate);
                assert!((back - value).abs() < 1e-6, "{value} @ {rate} came back as {back}");
            }
        }
    }

    #[test]
    fn convert_same_currency_is_identity() {
        assert_eq!(convert(42.0, Currency::Twd, Currency::Twd, 30.0), 42.0);
        assert_eq!(convert(42.0, Currency::Usd, Currency::Usd, 30.0), 42.0);
    }

    #[test]
    fn zero_rate_to_usd_is_infinite() {
        assert!(to_usd(100.0, Currency::Twd, 0.0).is_infinite());
    }

    #[test]
    fn total_value_subtracts_liabilities() {
        let assets = vec![
            Asset::cash("Cash", AssetType::CashTwd, 100_000.0),
            Asset::cash("USD cash", AssetType::CashUsd, 1_000.0),
            Asset::cash("Car loan", AssetType::Liability, 40_000.0),
        ];
        assert!(approx(
            total_value(&assets, Currency::Twd, 30.0),
            100_000.0 + 30_000.0 - 40_000.0
        ));
        assert!(approx(total_value(&assets, Currency::Usd, 30.0), 3_000.0));
    }

    #[test]
    fn asset_value_in_is_signed() {
        let loan = Asset::new("Loan", AssetType::Liability, 100.0, Currency::Usd);
        assert_eq!(asset_value_in(&loan, Currency::Twd, 30.0), -3_000.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Snapshots
// ═══════════════════════════════════════════════════════════════════

mod snapshots {
    use super::*;

    #[test]
    fn needed_without_previous_snapshot() {
        assert!(is_snapshot_needed(None, 30));
    }

    #[test]
    fn not_needed_after_29_days() {
        let now = day(2025, 3, 1);
        let last = now - Duration::days(29);
        assert!(!is_snapshot_needed_at(Some(last), 30, now));
    }

    #[test]
    fn needed_after_31_days() {
        let now = day(2025, 3, 1);
        let last = now - Duration::days(31);
        assert!(is_snapshot_needed_at(Some(last), 30, now));
    }

    #[test]
    fn needed_exactly_at_interval() {
        let now = day(2025, 3, 1);
        assert!(is_snapshot_needed_at(Some(now - Duration::days(30)), 30, now));
    }

    #[test]
    fn partial_days_do_not_count() {
        let now = day(2025, 3, 1);
        let last = now - Duration::days(30) + Duration::hours(1);
        assert!(!is_snapshot_needed_at(Some(last), 30, now));
    }

    #[test]
    fn wall_clock_variant_uses_now() {
        assert!(!is_snapshot_needed(Some(Utc::now()), 30));
        assert!(is_snapshot_needed(Some(Utc::now() - Duration::days(400)), 30));
    }

    #[test]
    fn create_computes_totals_once() {
        let assets = vec![
            Asset::cash("Cash", AssetType::CashTwd, 31_500.0),
            Asset::cash("USD", AssetType::CashUsd, 1_000.0),
        ];
        let s = create_snapshot(&assets, 31.5, day(2025, 1, 1), Some("year start".into())).unwrap();
        assert!(approx(s.total_value_twd, 63_000.0));
        assert!(approx(s.total_value_usd, 2_000.0));
        assert_eq!(s.exchange_rate, 31.5);
        assert_eq!(s.assets.len(), 2);
        assert_eq!(s.notes.as_deref(), Some("year start"));
    }

    #[test]
    fn create_copies_assets() {
        let mut assets = vec![Asset::cash("Cash", AssetType::CashTwd, 100.0)];
        let s = snap(&assets, 31.5, day(2025, 1, 1));
        assets[0].value = 999.0;
        assert_eq!(s.assets[0].value, 100.0);
    }

    #[test]
    fn create_drops_blank_notes() {
        let s = create_snapshot(&[], 31.5, day(2025, 1, 1), Some("   ".into())).unwrap();
        assert!(s.notes.is_none());
    }

    #[test]
    fn create_rejects_bad_rate() {
        for rate in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = create_snapshot(&[], rate, day(2025, 1, 1), None);
            assert!(matches!(result, Err(CoreError::ValidationError(_))));
        }
    }

    #[test]
    fn sorted_by_date_orders_oldest_first() {
        let snaps = vec![
            snap(&[], 30.0, day(2025, 3, 1)),
            snap(&[], 30.0, day(2025, 1, 1)),
            snap(&[], 30.0, day(2025, 2, 1)),
        ];
        let dates: Vec<_> = sorted_by_date(&snaps).iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(2025, 1, 1), day(2025, 2, 1), day(2025, 3, 1)]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Growth attribution
// ═══════════════════════════════════════════════════════════════════

mod growth {
    use super::*;

    #[test]
    fn identical_snapshots_have_zero_growth() {
        let assets = vec![
            Asset::cash("Cash", AssetType::CashTwd, 100_000.0),
            Asset::stock("TSMC", AssetType::StockTw, "2330", 100.0, 60_000.0),
        ];
        let a = snap(&assets, 31.5, day(2025, 1, 1));
        let b = snap(&assets, 31.5, day(2025, 2, 1));
        let g = analyze_growth_between_snapshots(&a, &b, Currency::Twd);
        assert_eq!(g.total_growth, 0.0);
        assert_eq!(g.new_capital, 0.0);
        assert_eq!(g.investment_returns, 0.0);
        assert_eq!(g.new_capital_percentage, 0.0);
        assert_eq!(g.investment_returns_percentage, 0.0);
    }

    #[test]
    fn new_cash_asset_is_all_new_capital() {
        let cash = Asset::cash("Cash", AssetType::CashTwd, 100_000.0);
        let start = snap(&[cash.clone()], 31.5, day(2025, 1, 1));
        let end = snap(
            &[cash, Asset::cash("Bonus", AssetType::CashTwd, 50_000.0)],
            31.5,
            day(2025, 2, 1),
        );

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 50_000.0));
        assert!(approx(g.new_capital, 50_000.0));
        assert!(approx(g.investment_returns, 0.0));
        assert!(approx(g.new_capital_percentage, 100.0));
        assert!(approx(g.investment_returns_percentage, 0.0));
    }

    #[test]
    fn new_stock_asset_is_all_new_capital() {
        let start = snap(&[], 31.5, day(2025, 1, 1));
        let end = snap(
            &[Asset::stock("Apple", AssetType::StockUs, "AAPL", 10.0, 2_000.0)],
            31.5,
            day(2025, 2, 1),
        );
        let g = analyze_growth_between_snapshots(&start, &end, Currency::Usd);
        assert!(approx(g.new_capital, 2_000.0));
        assert!(approx(g.investment_returns, 0.0));
    }

    #[test]
    fn unchanged_shares_are_all_returns() {
        let mut stock = Asset::stock("TSMC", AssetType::StockTw, "2330", 100.0, 60_000.0);
        let start = snap(&[stock.clone()], 31.5, day(2025, 1, 1));
        stock.value = 75_000.0;
        let end = snap(&[stock], 31.5, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 15_000.0));
        assert!(approx(g.new_capital, 0.0));
        assert!(approx(g.investment_returns, 15_000.0));
        assert!(approx(g.investment_returns_percentage, 100.0));
    }

    #[test]
    fn bought_shares_priced_at_end_price() {
        // 10 shares at 100 -> 15 shares at 120
        let mut stock = Asset::stock("Apple", AssetType::StockUs, "AAPL", 10.0, 1_000.0);
        let start = snap(&[stock.clone()], 30.0, day(2025, 1, 1));
        stock.shares = Some(15.0);
        stock.value = 1_800.0;
        let end = snap(&[stock], 30.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Usd);
        assert!(approx(g.total_growth, 800.0));
        assert!(approx(g.new_capital, 600.0));
        assert!(approx(g.investment_returns, 200.0));
        assert!(approx(g.new_capital_percentage, 75.0));
        assert!(approx(g.investment_returns_percentage, 25.0));
    }

    #[test]
    fn sold_out_position_is_all_new_capital() {
        let mut stock = Asset::stock("Apple", AssetType::StockUs, "AAPL", 10.0, 1_000.0);
        let start = snap(&[stock.clone()], 30.0, day(2025, 1, 1));
        stock.shares = Some(0.0);
        stock.value = 0.0;
        let end = snap(&[stock], 30.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Usd);
        assert!(approx(g.new_capital, -1_000.0));
        assert!(approx(g.investment_returns, 0.0));
    }

    #[test]
    fn unknown_share_counts_are_returns() {
        let mut stock = Asset::new("Fund", AssetType::StockUs, 1_000.0, Currency::Usd);
        stock.symbol = Some("VT".into());
        let start = snap(&[stock.clone()], 30.0, day(2025, 1, 1));
        stock.value = 1_100.0;
        let end = snap(&[stock], 30.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Usd);
        assert!(approx(g.investment_returns, 100.0));
        assert!(approx(g.new_capital, 0.0));
    }

    #[test]
    fn cash_and_tbills_changes_are_new_capital() {
        let mut cash = Asset::cash("Cash", AssetType::CashUsd, 1_000.0);
        let mut bills = Asset::cash("T-Bills", AssetType::UsTbills, 5_000.0);
        let start = snap(&[cash.clone(), bills.clone()], 30.0, day(2025, 1, 1));
        cash.value = 1_500.0;
        bills.value = 5_050.0;
        let end = snap(&[cash, bills], 30.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Usd);
        assert!(approx(g.new_capital, 550.0));
        assert!(approx(g.investment_returns, 0.0));
    }

    #[test]
    fn paying_down_liability_is_new_capital() {
        let mut loan = Asset::cash("Loan", AssetType::Liability, 100_000.0);
        let start = snap(&[loan.clone()], 30.0, day(2025, 1, 1));
        loan.value = 90_000.0;
        let end = snap(&[loan], 30.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 10_000.0));
        assert!(approx(g.new_capital, 10_000.0));
        assert!(approx(g.investment_returns, 0.0));
    }

    #[test]
    fn removed_asset_is_a_withdrawal() {
        let cash = Asset::cash("Cash", AssetType::CashTwd, 100_000.0);
        let gone = Asset::cash("Old account", AssetType::CashTwd, 20_000.0);
        let start = snap(&[cash.clone(), gone], 30.0, day(2025, 1, 1));
        let end = snap(&[cash], 30.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, -20_000.0));
        assert!(approx(g.new_capital, -20_000.0));
        // Share of the decline, so positive
        assert!(approx(g.new_capital_percentage, 100.0));
    }

    #[test]
    fn exchange_rate_move_on_unchanged_usd_stock_is_returns() {
        let stock = Asset::stock("Apple", AssetType::StockUs, "AAPL", 10.0, 1_000.0);
        let start = snap(&[stock.clone()], 30.0, day(2025, 1, 1));
        let end = snap(&[stock], 32.0, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 2_000.0));
        assert!(approx(g.investment_returns, 2_000.0));
    }

    #[test]
    fn components_reconcile_with_total() {
        let mut cash = Asset::cash("Cash", AssetType::CashTwd, 50_000.0);
        let mut usd = Asset::cash("USD", AssetType::CashUsd, 2_000.0);
        let mut tw = Asset::stock("TSMC", AssetType::StockTw, "2330", 100.0, 60_000.0);
        let mut us = Asset::stock("Apple", AssetType::StockUs, "AAPL", 10.0, 1_800.0);
        let mut loan = Asset::cash("Loan", AssetType::Liability, 200_000.0);
        let start = snap(
            &[cash.clone(), usd.clone(), tw.clone(), us.clone(), loan.clone()],
            31.0,
            day(2025, 1, 1),
        );

        cash.value = 42_000.0;
        usd.value = 2_500.0;
        tw.shares = Some(150.0);
        tw.value = 99_000.0;
        us.value = 2_100.0;
        loan.value = 190_000.0;
        let new = Asset::cash("New", AssetType::CashTwd, 5_000.0);
        let end = snap(&[cash, usd, tw, us, loan, new], 32.5, day(2025, 2, 1));

        for currency in [Currency::Twd, Currency::Usd] {
            let g = analyze_growth_between_snapshots(&start, &end, currency);
            let drift = g.new_capital + g.investment_returns - g.total_growth;
            assert!(drift.abs() <= 1.0, "{currency}: drift {drift}");
        }
    }

    #[test]
    fn duplicate_names_force_returns_to_reconcile() {
        // Same name twice: only the later holding is compared.
        let first = Asset::cash("Savings", AssetType::CashTwd, 1_000.0);
        let second = Asset::cash("Savings", AssetType::CashTwd, 2_000.0);
        let start = snap(&[first.clone(), second.clone()], 31.5, day(2025, 1, 1));

        let mut grown = first;
        grown.value = 6_000.0;
        let end = snap(&[grown, second], 31.5, day(2025, 2, 1));

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 5_000.0));
        assert!(approx(g.new_capital, 0.0));
        assert!(approx(g.investment_returns, g.total_growth - g.new_capital));
        assert!(approx(g.investment_returns, 5_000.0));
        assert!(approx(g.investment_returns_percentage, 100.0));
    }

    #[test]
    fn stale_stored_total_is_absorbed_by_returns() {
        let start = snap(&[Asset::cash("Cash", AssetType::CashTwd, 10_000.0)], 31.5, day(2025, 1, 1));
        let mut end = snap(
            &[
                Asset::cash("Cash", AssetType::CashTwd, 10_000.0),
                Asset::cash("Gift", AssetType::CashTwd, 3_000.0),
            ],
            31.5,
            day(2025, 2, 1),
        );
        // Stored total no longer matches the holdings it was computed from.
        end.total_value_twd = 20_000.0;

        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 10_000.0));
        assert!(approx(g.new_capital, 3_000.0));
        assert!(approx(g.investment_returns, 7_000.0));
        assert!(approx(g.new_capital + g.investment_returns, g.total_growth));
    }

    #[test]
    fn renamed_asset_counts_as_removed_and_added() {
        let start = snap(&[Asset::cash("Old", AssetType::CashTwd, 1_000.0)], 30.0, day(2025, 1, 1));
        let end = snap(&[Asset::cash("New", AssetType::CashTwd, 1_000.0)], 30.0, day(2025, 2, 1));
        let g = analyze_growth_between_snapshots(&start, &end, Currency::Twd);
        assert!(approx(g.total_growth, 0.0));
        assert!(approx(g.new_capital, 0.0));
    }

    #[test]
    fn sources_over_history() {
        let mut cash = Asset::cash("Cash", AssetType::CashTwd, 100_000.0);
        let s1 = snap(&[cash.clone()], 30.0, day(2025, 1, 1));
        cash.value = 120_000.0;
        let s2 = snap(&[cash.clone()], 30.0, day(2025, 2, 1));
        cash.value = 150_000.0;
        let s3 = snap(&[cash], 30.0, day(2025, 3, 1));

        // Out of order on purpose
        let report = analyze_growth_sources(&[s3.clone(), s1.clone(), s2.clone()], Currency::Twd);
        assert_eq!(report.periods.len(), 2);
        assert_eq!(report.periods[0].start_snapshot_id, s1.id);
        assert_eq!(report.periods[0].end_snapshot_id, s2.id);
        assert_eq!(report.periods[1].end_snapshot_id, s3.id);
        assert!(approx(report.cumulative.total_growth, 50_000.0));
        assert!(approx(report.cumulative.new_capital, 50_000.0));
        assert!(approx(report.cumulative.new_capital_percentage, 100.0));
    }

    #[test]
    fn sources_need_two_snapshots() {
        let only = snap(&[], 30.0, day(2025, 1, 1));
        let report = analyze_growth_sources(&[only], Currency::Usd);
        assert!(report.periods.is_empty());
        assert_eq!(report.cumulative.total_growth, 0.0);
        assert_eq!(report.currency, Currency::Usd);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Charts
// ═══════════════════════════════════════════════════════════════════

mod charts {
    use super::*;

    #[test]
    fn moving_average_trailing_window() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn moving_average_window_one_is_identity() {
        let ma = moving_average(&[7.0, 8.0], 1);
        assert_eq!(ma, vec![Some(7.0), Some(8.0)]);
    }

    #[test]
    fn moving_average_zero_window() {
        assert_eq!(moving_average(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn moving_average_window_longer_than_series() {
        assert_eq!(moving_average(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn growth_rate_percent() {
        assert_eq!(growth_rate(100.0, 110.0), Some(10.0));
        assert_eq!(growth_rate(100.0, 90.0), Some(-10.0));
        assert_eq!(growth_rate(0.0, 10.0), None);
    }

    #[test]
    fn growth_rate_from_negative_net_worth() {
        // -100 -> -50 is an improvement
        assert_eq!(growth_rate(-100.0, -50.0), Some(50.0));
    }

    #[test]
    fn chart_points_follow_snapshots() {
        let s1 = snap(&[Asset::cash("C", AssetType::CashTwd, 100.0)], 30.0, day(2025, 2, 1));
        let s2 = snap(&[Asset::cash("C", AssetType::CashTwd, 200.0)], 30.0, day(2025, 1, 1));
        let s3 = snap(&[Asset::cash("C", AssetType::CashTwd, 300.0)], 30.0, day(2025, 3, 1));

        let chart = generate_growth_chart(&[s1, s2, s3], Currency::Twd, 2);
        assert_eq!(chart.len(), 3);
        assert_eq!(chart[0].date, day(2025, 1, 1));
        assert_eq!(chart[0].total_value, 200.0);
        assert_eq!(chart[0].growth_rate, None);
        assert_eq!(chart[0].moving_average, None);
        assert_eq!(chart[1].total_value, 100.0);
        assert_eq!(chart[1].growth_rate, Some(-50.0));
        assert_eq!(chart[1].moving_average, Some(150.0));
        assert_eq!(chart[2].growth_rate, Some(200.0));
        assert_eq!(chart[2].moving_average, Some(200.0));
    }

    #[test]
    fn chart_uses_frozen_usd_totals() {
        let s = snap(&[Asset::cash("C", AssetType::CashTwd, 3_000.0)], 30.0, day(2025, 1, 1));
        let chart = generate_growth_chart(&[s], Currency::Usd, 1);
        assert!(approx(chart[0].total_value, 100.0));
    }

    #[test]
    fn empty_history_gives_empty_chart() {
        assert!(generate_growth_chart(&[], Currency::Twd, 3).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Analytics
// ═══════════════════════════════════════════════════════════════════

mod analytics {
    use super::*;

    fn data() -> AppData {
        let mut data = AppData::default();
        data.current_assets.exchange_rate = 30.0;
        data.current_assets.assets = vec![
            Asset::cash("Cash", AssetType::CashTwd, 60_000.0),
            Asset::cash("USD", AssetType::CashUsd, 1_000.0),
            Asset::stock("TSMC", AssetType::StockTw, "2330", 10.0, 10_000.0),
            Asset::cash("Loan", AssetType::Liability, 20_000.0),
        ];
        data
    }

    #[test]
    fn summary_totals() {
        let data = data();
        let summary =
            AnalyticsService::new().get_portfolio_summary(&data.current_assets, &data.settings);
        assert!(approx(summary.total_assets, 100_000.0));
        assert!(approx(summary.total_liabilities, 20_000.0));
        assert!(approx(summary.total_value_twd, 80_000.0));
        assert!(approx(summary.total_value_usd, 80_000.0 / 30.0));
        assert_eq!(summary.asset_count, 4);
        assert_eq!(summary.exchange_rate, 30.0);
    }

    #[test]
    fn allocation_is_share_of_gross_assets() {
        let data = data();
        let summary =
            AnalyticsService::new().get_portfolio_summary(&data.current_assets, &data.settings);
        let pct = |t: AssetType| {
            summary
                .allocations
                .iter()
                .find(|a| a.asset_type == t)
                .map(|a| a.percentage)
                .unwrap()
        };
        assert!(approx(pct(AssetType::CashTwd), 60.0));
        assert!(approx(pct(AssetType::CashUsd), 30.0));
        assert!(approx(pct(AssetType::StockTw), 10.0));
        assert!(approx(pct(AssetType::Liability), 20.0));
    }

    #[test]
    fn allocation_compares_against_targets() {
        let mut data = data();
        data.settings.target_allocation.insert(AssetType::CashTwd, 50.0);
        data.settings.target_allocation.insert(AssetType::StockUs, 25.0);
        let summary =
            AnalyticsService::new().get_portfolio_summary(&data.current_assets, &data.settings);

        let cash = summary
            .allocations
            .iter()
            .find(|a| a.asset_type == AssetType::CashTwd)
            .unwrap();
        assert_eq!(cash.target_percentage, Some(50.0));
        assert!(approx(cash.difference.unwrap(), 10.0));

        // Targeted but not held
        let us = summary
            .allocations
            .iter()
            .find(|a| a.asset_type == AssetType::StockUs)
            .unwrap();
        assert_eq!(us.value, 0.0);
        assert!(approx(us.difference.unwrap(), -25.0));
    }

    #[test]
    fn allocations_follow_display_order() {
        let data = data();
        let summary =
            AnalyticsService::new().get_portfolio_summary(&data.current_assets, &data.settings);
        let order: Vec<AssetType> = summary.allocations.iter().map(|a| a.asset_type).collect();
        assert_eq!(
            order,
            vec![
                AssetType::CashTwd,
                AssetType::CashUsd,
                AssetType::StockTw,
                AssetType::Liability
            ]
        );
    }

    #[test]
    fn empty_list_has_zero_percentages() {
        let data = AppData::default();
        let summary =
            AnalyticsService::new().get_portfolio_summary(&data.current_assets, &data.settings);
        assert!(summary.allocations.is_empty());
        assert_eq!(summary.total_value_twd, 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// AssetService
// ═══════════════════════════════════════════════════════════════════

mod asset_service {
    use super::*;

    #[test]
    fn add_and_delete() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(&mut data, Asset::cash("Cash", AssetType::CashTwd, 1.0), day(2025, 1, 1))
            .unwrap();
        assert_eq!(data.current_assets.assets.len(), 1);
        assert_eq!(data.current_assets.last_modified, day(2025, 1, 1));

        let removed = svc.delete_asset(&mut data, &id, day(2025, 1, 2)).unwrap();
        assert_eq!(removed.id, id);
        assert!(data.current_assets.assets.is_empty());
    }

    #[test]
    fn add_rejects_invalid_assets() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let now = day(2025, 1, 1);

        let blank = Asset::cash("  ", AssetType::CashTwd, 1.0);
        assert!(matches!(
            svc.add_asset(&mut data, blank, now),
            Err(CoreError::ValidationError(_))
        ));

        let nan = Asset::cash("Cash", AssetType::CashTwd, f64::NAN);
        assert!(svc.add_asset(&mut data, nan, now).is_err());

        let negative_shares = Asset::stock("X", AssetType::StockUs, "X", -1.0, 10.0);
        assert!(svc.add_asset(&mut data, negative_shares, now).is_err());
        assert!(data.current_assets.assets.is_empty());
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let asset = Asset::cash("Cash", AssetType::CashTwd, 1.0);
        svc.add_asset(&mut data, asset.clone(), day(2025, 1, 1)).unwrap();
        assert!(svc.add_asset(&mut data, asset, day(2025, 1, 1)).is_err());
    }

    #[test]
    fn delete_missing_asset() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        assert!(matches!(
            svc.delete_asset(&mut data, "nope", day(2025, 1, 1)),
            Err(CoreError::AssetNotFound(_))
        ));
    }

    #[test]
    fn update_with_no_snapshots_takes_pre_update_snapshot() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(&mut data, Asset::cash("Cash", AssetType::CashTwd, 100.0), day(2025, 1, 1))
            .unwrap();

        let update = AssetUpdate {
            value: Some(250.0),
            ..Default::default()
        };
        let snapshot_id = svc.update_asset(&mut data, &id, update, day(2025, 1, 2)).unwrap();

        assert!(snapshot_id.is_some());
        assert_eq!(data.snapshots.len(), 1);
        assert_eq!(data.snapshots[0].assets[0].value, 100.0);
        assert_eq!(data.snapshots[0].total_value_twd, 100.0);
        assert_eq!(data.current_assets.assets[0].value, 250.0);
    }

    #[test]
    fn update_within_interval_skips_snapshot() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(&mut data, Asset::cash("Cash", AssetType::CashTwd, 100.0), day(2025, 1, 1))
            .unwrap();
        svc.take_snapshot(&mut data, None, day(2025, 1, 1)).unwrap();

        let update = AssetUpdate {
            value: Some(200.0),
            ..Default::default()
        };
        let taken = svc.update_asset(&mut data, &id, update, day(2025, 1, 30)).unwrap();
        assert!(taken.is_none());
        assert_eq!(data.snapshots.len(), 1);
    }

    #[test]
    fn update_after_interval_takes_snapshot() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(&mut data, Asset::cash("Cash", AssetType::CashTwd, 100.0), day(2025, 1, 1))
            .unwrap();
        svc.take_snapshot(&mut data, None, day(2025, 1, 1)).unwrap();

        let update = AssetUpdate {
            value: Some(200.0),
            ..Default::default()
        };
        let taken = svc.update_asset(&mut data, &id, update, day(2025, 2, 1)).unwrap();
        assert!(taken.is_some());
        assert_eq!(data.snapshots.len(), 2);
        assert_eq!(data.snapshots[1].date, day(2025, 2, 1));
        assert_eq!(data.snapshots[1].assets[0].value, 100.0);
    }

    #[test]
    fn invalid_update_changes_nothing() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(&mut data, Asset::cash("Cash", AssetType::CashTwd, 100.0), day(2025, 1, 1))
            .unwrap();

        let update = AssetUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(svc.update_asset(&mut data, &id, update, day(2025, 3, 1)).is_err());
        assert!(data.snapshots.is_empty());
        assert_eq!(data.current_assets.assets[0].name, "Cash");
    }

    #[test]
    fn update_normalizes_symbol_and_notes() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(
                &mut data,
                Asset::stock("Apple", AssetType::StockUs, "AAPL", 1.0, 200.0).with_notes("x"),
                day(2025, 1, 1),
            )
            .unwrap();
        svc.take_snapshot(&mut data, None, day(2025, 1, 1)).unwrap();

        let update = AssetUpdate {
            symbol: Some(" msft ".into()),
            notes: Some("  ".into()),
            ..Default::default()
        };
        svc.update_asset(&mut data, &id, update, day(2025, 1, 2)).unwrap();
        let asset = &data.current_assets.assets[0];
        assert_eq!(asset.symbol.as_deref(), Some("MSFT"));
        assert!(asset.notes.is_none());
    }

    #[test]
    fn apply_price_multiplies_shares() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(
                &mut data,
                Asset::stock("TSMC", AssetType::StockTw, "2330", 1_000.0, 500_000.0),
                day(2025, 1, 1),
            )
            .unwrap();

        let value = svc.apply_price(&mut data, &id, 600.0, day(2025, 1, 2)).unwrap();
        assert_eq!(value, 600_000.0);
        assert_eq!(data.current_assets.assets[0].value, 600_000.0);
        assert!(data.snapshots.is_empty());
    }

    #[test]
    fn apply_price_requires_shares() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc
            .add_asset(&mut data, Asset::cash("Cash", AssetType::CashTwd, 1.0), day(2025, 1, 1))
            .unwrap();
        assert!(svc.apply_price(&mut data, &id, 10.0, day(2025, 1, 2)).is_err());
    }

    #[test]
    fn snapshots_stay_date_ordered() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let late = svc.take_snapshot(&mut data, None, day(2025, 3, 1)).unwrap();
        let early = svc.take_snapshot(&mut data, None, day(2025, 1, 1)).unwrap();
        let mid = svc.take_snapshot(&mut data, None, day(2025, 2, 1)).unwrap();
        let ids: Vec<&str> = data.snapshots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![early.as_str(), mid.as_str(), late.as_str()]);
    }

    #[test]
    fn snapshot_notes_can_be_edited() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc.take_snapshot(&mut data, None, day(2025, 1, 1)).unwrap();
        svc.set_snapshot_notes(&mut data, &id, Some("bonus month".into())).unwrap();
        assert_eq!(data.snapshots[0].notes.as_deref(), Some("bonus month"));
        svc.set_snapshot_notes(&mut data, &id, None).unwrap();
        assert!(data.snapshots[0].notes.is_none());
        assert!(matches!(
            svc.set_snapshot_notes(&mut data, "missing", None),
            Err(CoreError::SnapshotNotFound(_))
        ));
    }

    #[test]
    fn delete_snapshot() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        let id = svc.take_snapshot(&mut data, None, day(2025, 1, 1)).unwrap();
        svc.delete_snapshot(&mut data, &id).unwrap();
        assert!(data.snapshots.is_empty());
        assert!(svc.delete_snapshot(&mut data, &id).is_err());
    }

    #[test]
    fn exchange_rate_must_be_positive() {
        let svc = AssetService::new();
        let mut data = AppData::default();
        svc.set_exchange_rate(&mut data, 32.1, day(2025, 1, 1)).unwrap();
        assert_eq!(data.current_assets.exchange_rate, 32.1);
        assert!(svc.set_exchange_rate(&mut data, 0.0, day(2025, 1, 1)).is_err());
        assert!(svc.set_exchange_rate(&mut data, f64::NAN, day(2025, 1, 1)).is_err());
        assert_eq!(data.current_assets.exchange_rate, 32.1);
    }

    #[test]
    fn settings_validation() {
        let svc = AssetService::new();
        let mut settings = AppSettings::default();
        assert!(svc.validate_settings(&settings).is_ok());

        settings.snapshot_interval = 0;
        assert!(svc.validate_settings(&settings).is_err());
        settings.snapshot_interval = 7;

        settings.target_allocation.insert(AssetType::CashTwd, 60.0);
        settings.target_allocation.insert(AssetType::StockUs, 40.0);
        assert!(svc.validate_settings(&settings).is_ok());

        settings.target_allocation.insert(AssetType::StockTw, 1.0);
        assert!(svc.validate_settings(&settings).is_err());

        settings.target_allocation.clear();
        settings.target_allocation.insert(AssetType::CashTwd, 120.0);
        assert!(svc.validate_settings(&settings).is_err());
    }
}
