use std::collections::BTreeMap;

use ashq_backtest::{BacktestEngine, BacktestError, EngineState};
use ashq_config::BacktestConfig;
use ashq_data::{bar_on, score_and_rank, stratified_sample, DailyFrame, DataManager, LoadedMarket};
use ashq_schemas::{DailyBar, Symbol, TradingCalendar};
use ashq_strategy::{Signal, Strategy};
use ashq_testkit::{calendar, date, synthetic_market, NoOpStrategy, ScoreByCloseStrategy, ScriptedStrategy};
use chrono::NaiveDate;

/// A fixed, in-memory `DataManager` built from `synthetic_market`, for
/// driving the engine through a known scenario without any filesystem
/// access.
struct FixtureDataManager {
    market: BTreeMap<Symbol, DailyFrame>,
    trading_dates: TradingCalendar,
}

impl DataManager for FixtureDataManager {
    fn load_universe(&self, _index_code: &str) -> anyhow::Result<Vec<Symbol>> {
        Ok(self.market.keys().cloned().collect())
    }

    fn load_symbol(&self, symbol: &str, _start: NaiveDate, _end: NaiveDate) -> anyhow::Result<DailyFrame> {
        self.market
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown symbol {symbol}"))
    }

    fn load_market(
        &self,
        symbols: &[Symbol],
        _start: NaiveDate,
        _end: NaiveDate,
        max_n: Option<usize>,
        scorer: Option<&dyn Fn(&Symbol, &DailyBar) -> f64>,
    ) -> anyhow::Result<LoadedMarket> {
        let selected: Vec<Symbol> = match (max_n, scorer) {
            (Some(max_n), Some(scorer)) => score_and_rank(
                symbols,
                |s| self.market.get(s).and_then(|f| bar_on(f, self.trading_dates.last().unwrap()).cloned()),
                scorer,
                max_n,
            ),
            (Some(max_n), None) => stratified_sample(symbols, max_n),
            (None, _) => symbols.to_vec(),
        };

        let market_data = selected
            .into_iter()
            .filter_map(|s| self.market.get(&s).cloned().map(|f| (s, f)))
            .collect();

        Ok(LoadedMarket { market_data, trading_dates: self.trading_dates.clone() })
    }
}

fn five_day_calendar() -> Vec<&'static str> {
    vec!["2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-08"]
}

fn fixture(symbols_and_returns: &[(&str, f64)]) -> FixtureDataManager {
    let dates = five_day_calendar();
    let trading_dates = calendar(&dates);
    let dates: Vec<NaiveDate> = dates.iter().map(|d| date(d)).collect();
    let market = synthetic_market(symbols_and_returns, &dates, 10.0);
    FixtureDataManager { market, trading_dates }
}

fn config(output: &std::path::Path) -> BacktestConfig {
    let mut cfg = BacktestConfig::default();
    cfg.start_date = date("2024-01-02");
    cfg.end_date = date("2024-01-08");
    cfg.benchmark = "000300.SH".to_string();
    cfg.output_dir = output.to_path_buf();
    cfg
}

#[test]
fn engine_rejects_run_before_data_is_loaded() {
    let cfg = config(&std::env::temp_dir());
    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    assert_eq!(engine.state(), EngineState::Ready);

    let err = engine.run().unwrap_err();
    assert!(matches!(err, BacktestError::InvalidState { expected: EngineState::Armed, actual: EngineState::Ready }));
}

#[test]
fn noop_strategy_produces_one_snapshot_per_trading_day_with_no_trades() {
    let cfg = config(&std::env::temp_dir());
    let data = fixture(&[("000001.SZ", 0.0), ("000002.SZ", 0.0)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();
    assert_eq!(engine.state(), EngineState::Armed);

    let result = engine.run().unwrap();
    assert_eq!(engine.state(), EngineState::Done);
    assert_eq!(result.trading_summary.total_trades, 0);
    assert_eq!(result.portfolio_summary.cash, 1_000_000.0);
}

#[test]
fn scripted_buy_then_sell_updates_cash_and_trade_counts() {
    let cfg = config(&std::env::temp_dir());
    let data = fixture(&[("000001.SZ", 0.0)]);

    let buy_date = date("2024-01-03");
    let sell_date = date("2024-01-05");
    let strategy = ScriptedStrategy::new()
        .on(buy_date, vec![Signal::buy("000001.SZ", 10.0, 0.2).unwrap()])
        .on(sell_date, vec![Signal::sell("000001.SZ", 10.0, None).unwrap()]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(strategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();

    let result = engine.run().unwrap();
    assert_eq!(result.trading_summary.total_trades, 2);
    assert_eq!(result.trading_summary.buy_trades, 1);
    assert_eq!(result.trading_summary.sell_trades, 1);
    assert!(result.portfolio_summary.positions.is_empty());
    assert!(result.portfolio_summary.cash < 1_000_000.0);
}

#[test]
fn stop_loss_forces_a_sell_without_a_strategy_signal() {
    let cfg = config(&std::env::temp_dir());
    // A sharp daily decline blows through the default 6% stop-loss quickly.
    let data = fixture(&[("000001.SZ", -0.09)]);

    let buy_date = date("2024-01-02");
    let strategy =
        ScriptedStrategy::new().on(buy_date, vec![Signal::buy("000001.SZ", 10.0, 0.2).unwrap()]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(strategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();

    let result = engine.run().unwrap();
    assert_eq!(result.trading_summary.buy_trades, 1);
    assert!(result.trading_summary.sell_trades >= 1);
}

#[test]
fn scoring_hook_strategy_drives_top_k_universe_selection() {
    let cfg = config(&std::env::temp_dir());
    let data = fixture(&[("000001.SZ", 0.05), ("000002.SZ", 0.01), ("000003.SZ", -0.02)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(ScoreByCloseStrategy)).unwrap();
    engine.load_data(&data, Some(&["000001.SZ".to_string(), "000002.SZ".to_string(), "000003.SZ".to_string()]), Some(2)).unwrap();

    let result = engine.run().unwrap();
    assert_eq!(result.trading_summary.total_trades, 0);
}

#[test]
fn run_fails_fatally_when_no_market_data_is_loaded() {
    let cfg = config(&std::env::temp_dir());
    let data = fixture(&[("000001.SZ", 0.0)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    // Request a universe that does not exist in the fixture: load_data
    // succeeds (no per-symbol error), but market_data ends up empty.
    engine.load_data(&data, Some(&["999999.SZ".to_string()]), None).unwrap();

    let err = engine.run().unwrap_err();
    assert!(matches!(err, BacktestError::NoMarketData));
}

#[test]
fn realtime_callback_fires_once_per_trading_day() {
    let cfg = config(&std::env::temp_dir());
    let data = fixture(&[("000001.SZ", 0.0)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();

    let calls = std::rc::Rc::new(std::cell::RefCell::new(0usize));
    let calls_clone = calls.clone();
    engine.set_realtime_callback(Box::new(move |_update| {
        *calls_clone.borrow_mut() += 1;
    }));

    engine.run().unwrap();
    assert_eq!(*calls.borrow(), five_day_calendar().len());
}

#[test]
fn artifacts_skip_gated_files_when_config_flags_are_off() {
    let tmp = std::env::temp_dir().join(format!("ashq-backtest-test-gated-{}", std::process::id()));
    let mut cfg = config(&tmp);
    cfg.save_trades = false;
    cfg.save_positions = false;
    cfg.save_performance = false;
    let data = fixture(&[("000001.SZ", 0.0)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();
    let result = engine.run().unwrap();

    let paths = ashq_backtest::write_run_artifacts(&tmp, "20240101T000000Z", &result, &[]).unwrap();
    assert!(paths.result_json.exists());
    assert!(paths.trades_csv.is_none());
    assert!(paths.portfolio_csv.is_none());
    assert!(paths.report_md.is_none());

    std::fs::remove_dir_all(&tmp).ok();
}

#[test]
fn reset_returns_engine_to_idle() {
    let cfg = config(&std::env::temp_dir());
    let data = fixture(&[("000001.SZ", 0.0)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();
    engine.run().unwrap();

    engine.reset();
    assert_eq!(engine.state(), EngineState::Idle);
}

#[test]
fn run_result_and_artifacts_round_trip_through_persistence() {
    let tmp = std::env::temp_dir().join(format!("ashq-backtest-test-{}", std::process::id()));
    let cfg = config(&tmp);
    let data = fixture(&[("000001.SZ", 0.0)]);

    let mut engine = BacktestEngine::new(cfg).unwrap();
    engine.set_strategy(Box::new(NoOpStrategy)).unwrap();
    engine.load_data(&data, None, None).unwrap();
    let result = engine.run().unwrap();

    let paths = ashq_backtest::write_run_artifacts(&tmp, "20240101T000000Z", &result, &[]).unwrap();
    assert!(paths.result_json.exists());
    assert!(paths.trades_csv.as_ref().unwrap().exists());
    assert!(paths.portfolio_csv.as_ref().unwrap().exists());
    assert!(paths.report_md.as_ref().unwrap().exists());

    let raw = std::fs::read_to_string(&paths.result_json).unwrap();
    let round_tripped: ashq_backtest::BacktestRunResult = serde_json::from_str(&raw).unwrap();
    assert_eq!(round_tripped.strategy_info.name, result.strategy_info.name);

    std::fs::remove_dir_all(&tmp).ok();
}
