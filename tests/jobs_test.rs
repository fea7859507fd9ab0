//! Seeding, daily update and maintenance jobs against an in-memory store.

mod common;

use approx::assert_relative_eq;
use common::*;
use swingtrader::adapters::sqlite_adapter::SqliteAdapter;
use swingtrader::domain::admission::SkipReason;
use swingtrader::domain::bar::DailyBar;
use swingtrader::domain::corporate_action::CorporateActionKind;
use swingtrader::domain::error::{ErrorKind, SwingtraderError};
use swingtrader::domain::market::MarketStatus;
use swingtrader::domain::tracked_asset::{self, TrackedAsset};
use swingtrader::jobs::check_market::check_market;
use swingtrader::jobs::context::JobContext;
use swingtrader::jobs::initial_load::{initial_load, lookback_start};
use swingtrader::jobs::maintenance::{rollback_latest, show_entries, verify_latest};
use swingtrader::jobs::run_job;
use swingtrader::jobs::update_indicators::update_indicators;
use swingtrader::ports::store_port::StorePort;
use chrono::NaiveDate;

fn seed_day() -> NaiveDate {
    date(2024, 3, 6)
}

fn latest_day() -> NaiveDate {
    date(2024, 3, 5)
}

fn update_day() -> NaiveDate {
    date(2024, 3, 7)
}

fn bars(base: f64) -> Vec<DailyBar> {
    make_bars(date(2024, 1, 1), date(2024, 3, 15), base, 5_000)
}

fn context<'a>(
    store: &'a SqliteAdapter,
    market_data: &'a MockMarketData,
    notifier: &'a RecordingNotifier,
) -> JobContext<'a> {
    JobContext::new(store, market_data, notifier, test_config())
}

/// Unadjusted history: closes before `ex_date` scaled up by `factor`.
fn pre_split(base: f64, factor: f64, ex_date: NaiveDate) -> Vec<DailyBar> {
    bars(base)
        .into_iter()
        .map(|mut b| {
            if b.date < ex_date {
                b.close *= factor;
            }
            b
        })
        .collect()
}

fn two_symbols() -> MockMarketData {
    MockMarketData::new()
        .with_bars("AAPL", bars(100.0))
        .with_bars("MSFT", bars(300.0))
}

/// Expected state after seeding `bars` from `start` through `end`.
fn expected_state(symbol: &str, bars: &[DailyBar], start: NaiveDate, end: NaiveDate) -> TrackedAsset {
    let window: Vec<DailyBar> = bars
        .iter()
        .filter(|b| b.date >= start && b.date <= end)
        .cloned()
        .collect();
    let config = test_config();
    tracked_asset::seed(symbol, &window, &config.indicators, 0.0)
        .unwrap()
        .current
}

fn assert_same_state(actual: &TrackedAsset, expected: &TrackedAsset) {
    assert_eq!(actual.date, expected.date);
    assert_relative_eq!(actual.close, expected.close);
    assert_relative_eq!(actual.macd, expected.macd, epsilon = 1e-12);
    assert_relative_eq!(actual.macd_signal, expected.macd_signal, epsilon = 1e-12);
    assert_relative_eq!(actual.average_gain, expected.average_gain, epsilon = 1e-12);
    assert_relative_eq!(actual.average_loss, expected.average_loss, epsilon = 1e-12);
    assert_relative_eq!(actual.ema_long_trend, expected.ema_long_trend, epsilon = 1e-12);
    assert_eq!(actual.rsi_window.len(), expected.rsi_window.len());
    for (a, e) in actual.rsi_window.iter().zip(expected.rsi_window.iter()) {
        assert_relative_eq!(*a, *e, epsilon = 1e-9);
    }
    assert_eq!(actual.trend_window.to_vec(), expected.trend_window.to_vec());
}

/// Seed as of `seed_day` and run the market check that day.
fn seed_and_check(ctx: &JobContext<'_>) {
    initial_load(ctx, seed_day()).unwrap();
    let status = check_market(ctx, seed_day()).unwrap();
    assert!(status.market_is_open);
}

mod seeding {
    use super::*;

    #[test]
    fn seeds_admissible_symbols_and_skips_the_rest() {
        let mut thin = bars(50.0);
        for bar in &mut thin {
            bar.volume = 10;
        }
        let mut zero = bars(60.0);
        zero[40].volume = 0;

        let market_data = two_symbols()
            .with_bars("VXX", bars(20.0))
            .with_bars("THIN", thin)
            .with_bars("ZERO", zero)
            .with_bars("NEW", make_bars(date(2024, 2, 26), date(2024, 3, 15), 10.0, 5_000))
            .with_bars("MERG", bars(70.0))
            .with_bars("SPIN", bars(80.0))
            .with_bars("NOEX", bars(90.0))
            .with_action(action("MERG", CorporateActionKind::Merger, 1.0, 1.0, Some(date(2024, 2, 20))))
            .with_action(action("SPIN", CorporateActionKind::Spinoff, 1.0, 1.0, Some(date(2024, 2, 15))))
            .with_action(action("NOEX", CorporateActionKind::Split, 1.0, 2.0, None));
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        let report = initial_load(&ctx, seed_day()).unwrap();

        assert_eq!(report.latest_date, latest_day());
        assert_eq!(report.seeded, vec!["AAPL", "MSFT"]);
        let reason = |symbol: &str| {
            report
                .skipped
                .iter()
                .find(|s| s.symbol == symbol)
                .map(|s| s.reason.clone())
        };
        assert!(matches!(reason("THIN"), Some(SkipReason::SuspiciousVolume(_))));
        assert!(matches!(reason("ZERO"), Some(SkipReason::SuspiciousVolume(_))));
        assert!(matches!(reason("NEW"), Some(SkipReason::InsufficientHistory { bars: 7 })));
        assert_eq!(reason("MERG"), Some(SkipReason::Merger));
        assert_eq!(reason("SPIN"), Some(SkipReason::Spinoff));
        assert_eq!(reason("NOEX"), Some(SkipReason::SplitWithoutExDate));
        assert_eq!(reason("VXX"), None);
        assert_eq!(report.skipped.len(), 6);

        assert_eq!(store.tracked_symbols().unwrap(), vec!["AAPL", "MSFT"]);
        assert_eq!(store.records_on(latest_day()).unwrap().len(), 2);
        assert_eq!(store.asset_history("AAPL").unwrap().len(), 5);

        let status = store.load_market_status().unwrap().unwrap();
        assert_eq!(status.latest_date, latest_day());
        assert_eq!(status.day_of_month, 6);

        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("SPIN"));
    }

    #[test]
    fn seeded_state_matches_direct_seed() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        initial_load(&ctx, seed_day()).unwrap();

        let start = lookback_start(&ctx, seed_day());
        let expected = expected_state("AAPL", &bars(100.0), start, latest_day());
        let stored = store.latest_asset_state("AAPL").unwrap().unwrap();
        assert_same_state(&stored, &expected);
    }

    #[test]
    fn split_history_is_adjusted_before_seeding() {
        let ex_date = date(2024, 2, 20);
        let raw = pre_split(100.0, 4.0, ex_date);
        let market_data = MockMarketData::new()
            .with_bars("AAPL", bars(100.0))
            .with_bars("SPLT", raw)
            .with_action(action("SPLT", CorporateActionKind::Split, 1.0, 4.0, Some(ex_date)));
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        let report = initial_load(&ctx, seed_day()).unwrap();
        assert_eq!(report.seeded, vec!["AAPL", "SPLT"]);

        let clean = store.latest_asset_state("AAPL").unwrap().unwrap();
        let split = store.latest_asset_state("SPLT").unwrap().unwrap();
        assert_same_state(&split, &clean);
    }

    #[test]
    fn spinoff_alert_is_not_hidden_by_a_split() {
        let market_data = MockMarketData::new()
            .with_bars("AAPL", bars(100.0))
            .with_bars("SPLT", pre_split(100.0, 4.0, date(2024, 2, 20)))
            .with_action(action("SPLT", CorporateActionKind::Split, 1.0, 4.0, Some(date(2024, 2, 20))))
            .with_action(action("SPLT", CorporateActionKind::Spinoff, 1.0, 1.0, Some(date(2024, 2, 27))));
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        let report = initial_load(&ctx, seed_day()).unwrap();

        assert_eq!(report.seeded, vec!["AAPL"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].reason, SkipReason::Spinoff);
        assert_eq!(notifier.messages().len(), 1);
        assert!(notifier.messages()[0].contains("SPLT"));
    }

    #[test]
    fn second_load_leaves_tracked_symbols_alone() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        initial_load(&ctx, seed_day()).unwrap();
        let again = initial_load(&ctx, seed_day()).unwrap();

        assert!(again.seeded.is_empty());
        assert_eq!(again.already_tracked, 2);
        assert_eq!(store.asset_history("MSFT").unwrap().len(), 5);
    }

    #[test]
    fn data_source_failure_aborts_the_load() {
        let market_data = two_symbols().with_error("AAPL", "connection reset");
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        let err = run_job(&ctx, "initial load", |c| initial_load(c, seed_day())).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransientExternal);
        assert_eq!(notifier.messages().len(), 1);
        assert!(notifier.messages()[0].starts_with("initial load aborted"));
    }

    #[test]
    fn stale_series_is_skipped() {
        let market_data = two_symbols()
            .with_bars("HALT", make_bars(date(2024, 1, 1), date(2024, 3, 1), 40.0, 5_000));
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        let report = initial_load(&ctx, seed_day()).unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(
            report.skipped[0].reason,
            SkipReason::StaleHistory { last: date(2024, 3, 1) }
        );
        assert!(store.latest_asset_state("HALT").unwrap().is_none());
    }
}

mod market_check {
    use super::*;

    #[test]
    fn weekend_is_closed() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        initial_load(&ctx, seed_day()).unwrap();

        let status = check_market(&ctx, date(2024, 3, 9)).unwrap();

        assert!(!status.market_is_open);
        assert_eq!(status.day_of_month, 9);
        assert_eq!(status.latest_date, latest_day());
    }

    #[test]
    fn holiday_is_closed() {
        let market_data = two_symbols().with_holiday(date(2024, 3, 6));
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        store
            .save_market_status(&MarketStatus {
                day_of_month: 5,
                market_is_open: true,
                latest_date: date(2024, 3, 4),
            })
            .unwrap();

        assert!(!check_market(&ctx, date(2024, 3, 6)).unwrap().market_is_open);
    }

    #[test]
    fn requires_a_prior_load() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);

        let err = check_market(&ctx, seed_day()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
    }
}

mod daily_update {
    use super::*;

    #[test]
    fn advances_every_symbol_by_one_day() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        seed_and_check(&ctx);

        let report = update_indicators(&ctx, update_day()).unwrap();

        assert_eq!(report.target_date, Some(seed_day()));
        assert_eq!(report.advanced, vec!["AAPL", "MSFT"]);
        assert!(report.resumed.is_empty());
        assert_eq!(store.load_market_status().unwrap().unwrap().latest_date, seed_day());
        assert!(verify_latest(&ctx).unwrap().is_consistent());

        let start = lookback_start(&ctx, seed_day());
        let expected = expected_state("MSFT", &bars(300.0), start, seed_day());
        let stored = store.latest_asset_state("MSFT").unwrap().unwrap();
        assert_same_state(&stored, &expected);
        assert!(notifier.messages().is_empty());
    }

    #[test]
    fn closed_market_changes_nothing() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        initial_load(&ctx, seed_day()).unwrap();
        check_market(&ctx, date(2024, 3, 9)).unwrap();

        let report = update_indicators(&ctx, date(2024, 3, 10)).unwrap();

        assert!(!report.market_was_open);
        assert!(report.advanced.is_empty());
        assert_eq!(store.load_market_status().unwrap().unwrap().latest_date, latest_day());
    }

    #[test]
    fn missed_market_check_aborts_with_one_notification() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        initial_load(&ctx, seed_day()).unwrap();

        let err = run_job(&ctx, "indicator update", |c| {
            update_indicators(c, date(2024, 3, 8))
        })
        .unwrap_err();

        assert!(matches!(
            err,
            SwingtraderError::MarketOutOfSync { stored_day: 6, expected_day: 7 }
        ));
        let messages = notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("indicator update aborted"));
    }

    #[test]
    fn interrupted_update_resumes() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        seed_and_check(&ctx);
        update_indicators(&ctx, update_day()).unwrap();

        let mut status = store.load_market_status().unwrap().unwrap();
        status.latest_date = latest_day();
        store.save_market_status(&status).unwrap();

        let report = update_indicators(&ctx, update_day()).unwrap();
        assert!(report.advanced.is_empty());
        assert_eq!(report.resumed, vec!["AAPL", "MSFT"]);
        assert_eq!(store.load_market_status().unwrap().unwrap().latest_date, seed_day());
    }

    #[test]
    fn lagging_symbol_aborts_after_earlier_symbols_persist() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        seed_and_check(&ctx);

        let mut history = store.asset_history("MSFT").unwrap();
        history.pop();
        store.drop_symbol("MSFT").unwrap();
        store.insert_records(&history).unwrap();

        let err = update_indicators(&ctx, update_day()).unwrap_err();

        assert_eq!(
            err.to_string(),
            SwingtraderError::DateSkew {
                symbol: "MSFT".into(),
                expected: latest_day(),
                found: Some(date(2024, 3, 4)),
            }
            .to_string()
        );
        assert_eq!(store.latest_asset_state("AAPL").unwrap().unwrap().date, seed_day());
        assert_eq!(store.load_market_status().unwrap().unwrap().latest_date, latest_day());
    }

    #[test]
    fn duplicate_bar_is_rejected() {
        let mut doubled = bars(100.0);
        doubled.push(DailyBar::new(seed_day(), 1.0, 5_000));
        let market_data = MockMarketData::new().with_bars("AAPL", doubled);
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        seed_and_check(&ctx);

        let err = update_indicators(&ctx, update_day()).unwrap_err();

        assert!(matches!(err, SwingtraderError::UnexpectedBarCount { count: 2, .. }));
        assert_eq!(store.latest_asset_state("AAPL").unwrap().unwrap().date, latest_day());
    }

    #[test]
    fn missing_bar_is_transient() {
        let market_data = MockMarketData::new()
            .with_bars("AAPL", make_bars(date(2024, 1, 1), latest_day(), 100.0, 5_000));
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        seed_and_check(&ctx);

        let err = update_indicators(&ctx, update_day()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransientExternal);
    }

    #[test]
    fn split_reseeds_from_adjusted_history() {
        let seed_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &seed_data, &notifier));

        let ex_date = seed_day();
        let raw = pre_split(100.0, 2.0, ex_date);
        let update_data = MockMarketData::new()
            .with_bars("AAPL", raw)
            .with_bars("MSFT", bars(300.0))
            .with_action(action("AAPL", CorporateActionKind::Split, 1.0, 2.0, Some(ex_date)));
        let ctx = context(&store, &update_data, &notifier);

        let report = update_indicators(&ctx, update_day()).unwrap();

        assert_eq!(report.reseeded, vec!["AAPL"]);
        assert_eq!(report.advanced, vec!["MSFT"]);
        let start = lookback_start(&ctx, update_day());
        let expected = expected_state("AAPL", &bars(100.0), start, seed_day());
        let stored = store.latest_asset_state("AAPL").unwrap().unwrap();
        assert_same_state(&stored, &expected);
        assert_eq!(store.asset_history("AAPL").unwrap().len(), 5);
    }

    #[test]
    fn failed_split_fetch_is_retried_next_run() {
        let seed_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &seed_data, &notifier));

        let ex_date = seed_day();
        let split = action("AAPL", CorporateActionKind::Split, 1.0, 2.0, Some(ex_date));
        let failing = MockMarketData::new()
            .with_bars("AAPL", pre_split(100.0, 2.0, ex_date))
            .with_bars("MSFT", bars(300.0))
            .with_action(split.clone())
            .with_error("AAPL", "rate limited");
        let ctx = context(&store, &failing, &notifier);

        let err = update_indicators(&ctx, update_day()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::TransientExternal);
        assert_eq!(store.tracked_symbols().unwrap(), vec!["AAPL", "MSFT"]);
        assert_eq!(store.asset_history("AAPL").unwrap().len(), 5);
        assert_eq!(store.latest_asset_state("AAPL").unwrap().unwrap().date, latest_day());

        let recovered = MockMarketData::new()
            .with_bars("AAPL", pre_split(100.0, 2.0, ex_date))
            .with_bars("MSFT", bars(300.0))
            .with_action(split);
        let ctx = context(&store, &recovered, &notifier);

        let report = update_indicators(&ctx, update_day()).unwrap();

        assert_eq!(report.reseeded, vec!["AAPL"]);
        assert_eq!(report.advanced, vec!["MSFT"]);
        assert_eq!(store.latest_asset_state("AAPL").unwrap().unwrap().date, seed_day());
        assert!(verify_latest(&ctx).unwrap().is_consistent());
    }

    #[test]
    fn spinoff_alongside_a_split_still_aborts() {
        let seed_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &seed_data, &notifier));

        let update_data = two_symbols()
            .with_action(action("AAPL", CorporateActionKind::Split, 1.0, 2.0, Some(seed_day())))
            .with_action(action("AAPL", CorporateActionKind::Spinoff, 1.0, 1.0, Some(seed_day())));
        let ctx = context(&store, &update_data, &notifier);

        let err = update_indicators(&ctx, update_day()).unwrap_err();

        assert!(matches!(
            err,
            SwingtraderError::UnsupportedCorporateAction { ref symbol, .. } if symbol == "AAPL"
        ));
        assert_eq!(store.asset_history("AAPL").unwrap().len(), 5);
        assert_eq!(store.latest_asset_state("MSFT").unwrap().unwrap().date, latest_day());
    }

    #[test]
    fn changed_window_settings_require_a_reseed() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &market_data, &notifier));

        let mut config = test_config();
        config.indicators.rsi_window = 4;
        let ctx = JobContext::new(&store, &market_data, &notifier, config);

        let err = update_indicators(&ctx, update_day()).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(store.latest_asset_state("AAPL").unwrap().unwrap().date, latest_day());
        assert_eq!(store.latest_asset_state("MSFT").unwrap().unwrap().date, latest_day());
        assert!(show_entries(&ctx).is_err());
    }

    #[test]
    fn merger_drops_the_symbol() {
        let seed_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &seed_data, &notifier));

        let update_data = two_symbols()
            .with_action(action("MSFT", CorporateActionKind::Merger, 1.0, 1.0, Some(seed_day())));
        let ctx = context(&store, &update_data, &notifier);

        let report = update_indicators(&ctx, update_day()).unwrap();

        assert_eq!(report.dropped, vec!["MSFT"]);
        assert_eq!(store.tracked_symbols().unwrap(), vec!["AAPL"]);
        assert!(verify_latest(&ctx).unwrap().is_consistent());
    }

    #[test]
    fn spinoff_aborts_before_any_change() {
        let seed_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &seed_data, &notifier));

        let update_data = two_symbols()
            .with_action(action("MSFT", CorporateActionKind::Spinoff, 1.0, 1.0, Some(seed_day())));
        let ctx = context(&store, &update_data, &notifier);

        let err = update_indicators(&ctx, update_day()).unwrap_err();

        assert!(matches!(err, SwingtraderError::UnsupportedCorporateAction { .. }));
        assert_eq!(store.latest_asset_state("AAPL").unwrap().unwrap().date, latest_day());
    }

    #[test]
    fn announcements_for_untracked_symbols_are_ignored() {
        let seed_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        seed_and_check(&context(&store, &seed_data, &notifier));

        let update_data = two_symbols()
            .with_action(action("ZZZ", CorporateActionKind::Spinoff, 1.0, 1.0, Some(seed_day())));
        let ctx = context(&store, &update_data, &notifier);

        let report = update_indicators(&ctx, update_day()).unwrap();
        assert_eq!(report.advanced.len(), 2);
    }
}

mod maintenance {
    use super::*;

    #[test]
    fn rollback_steps_back_one_date() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        seed_and_check(&ctx);
        update_indicators(&ctx, update_day()).unwrap();

        let report = rollback_latest(&ctx).unwrap();

        assert_eq!(report.removed_date, seed_day());
        assert_eq!(report.restored_date, latest_day());
        assert_eq!(report.deleted, 2);
        let verify = verify_latest(&ctx).unwrap();
        assert_eq!(verify.latest_date, latest_day());
        assert!(verify.is_consistent());
    }

    #[test]
    fn verify_reports_missing_symbols() {
        let market_data = two_symbols();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        initial_load(&ctx, seed_day()).unwrap();

        let mut history = store.asset_history("AAPL").unwrap();
        history.pop();
        store.drop_symbol("AAPL").unwrap();
        store.insert_records(&history).unwrap();

        let report = verify_latest(&ctx).unwrap();
        assert_eq!(report.tracked, 2);
        assert_eq!(report.missing, vec!["AAPL"]);
    }

    #[test]
    fn rollback_needs_an_earlier_date() {
        let market_data = MockMarketData::new();
        let store = store();
        let notifier = RecordingNotifier::new();
        let ctx = context(&store, &market_data, &notifier);
        store
            .insert_records(&[record("AAPL", latest_day(), 10.0, 0.0, 0.0, vec![50.0], vec![true])])
            .unwrap();
        store
            .save_market_status(&MarketStatus {
                day_of_month: 6,
                market_is_open: true,
                latest_date: latest_day(),
            })
            .unwrap();

        let err = rollback_latest(&ctx).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvariantViolation);
        assert_eq!(store.records_on(latest_day()).unwrap().len(), 1);
    }
}
