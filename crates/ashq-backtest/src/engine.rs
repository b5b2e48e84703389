use std::collections::{BTreeMap, BTreeSet};
use std::panic::{catch_unwind, AssertUnwindSafe};

use ashq_config::BacktestConfig;
use ashq_data::{bar_on, DataManager};
use ashq_perf::{align_benchmark, synthesize_benchmark, BenchmarkSeries, PerformanceAnalyzer};
use ashq_portfolio::PortfolioManager;
use ashq_orders::OrderManager;
use ashq_schemas::{MarketDay, Side, Symbol, TradingCalendar};
use ashq_sim::TradingSimulator;
use ashq_strategy::{Signal, SignalAction, Strategy, StrategyContext};
use chrono::NaiveDate;

use crate::result::BacktestRunResult;

/// Synthetic-benchmark fallback parameters: a CSI300-like daily drift
/// and volatility. Only used when `config.benchmark` has no matching
/// frame in the loaded market data.
const BENCHMARK_SYNTH_MEAN_DAILY_RETURN: f64 = 0.0003;
const BENCHMARK_SYNTH_DAILY_VOLATILITY: f64 = 0.012;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Ready,
    Armed,
    Running,
    Done,
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BacktestError {
    /// `run`/`load_data` called before `set_strategy`.
    NoStrategy,
    /// A data-access call (universe/market load) failed.
    Data(String),
    /// `run` was called with no symbols loaded at all; per-symbol gaps
    /// on a given day are not an error and are absorbed by order
    /// rejection.
    NoMarketData,
    /// A method was called while the engine was in the wrong state.
    InvalidState { expected: EngineState, actual: EngineState },
    /// The strategy panicked; the date it panicked on is recorded and
    /// the engine transitions to `Errored` and stops.
    StrategyPanic { date: NaiveDate, message: String },
}

impl std::fmt::Display for BacktestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BacktestError::NoStrategy => write!(f, "no strategy registered"),
            BacktestError::Data(msg) => write!(f, "data access failed: {msg}"),
            BacktestError::NoMarketData => write!(f, "no market data loaded"),
            BacktestError::InvalidState { expected, actual } => {
                write!(f, "invalid engine state: expected {expected:?}, got {actual:?}")
            }
            BacktestError::StrategyPanic { date, message } => {
                write!(f, "strategy panicked on {date}: {message}")
            }
        }
    }
}

impl std::error::Error for BacktestError {}

/// One engine-pushed update per trading day, handed to an optional
/// realtime callback. The callback runs synchronously on the engine's
/// thread and must not mutate portfolio/order state; it only ever sees
/// a `&RealtimeUpdate`.
pub struct RealtimeUpdate<'a> {
    pub date: NaiveDate,
    pub portfolio_summary: &'a ashq_portfolio::PortfolioSummary,
    pub trades: &'a [ashq_schemas::Trade],
}

type RealtimeCallback = Box<dyn FnMut(&RealtimeUpdate)>;

/// Orchestrates one backtest run: mark-to-market, risk checks,
/// forced-sell, strategy signals, order execution, trade application,
/// and snapshotting, one trading day at a time.
pub struct BacktestEngine {
    config: BacktestConfig,
    simulator: TradingSimulator,
    order_manager: OrderManager,
    portfolio_manager: PortfolioManager,
    strategy: Option<Box<dyn Strategy>>,
    calendar: TradingCalendar,
    market_data: BTreeMap<Symbol, ashq_data::DailyFrame>,
    state: EngineState,
    realtime_callback: Option<RealtimeCallback>,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Result<Self, ashq_config::ConfigError> {
        config.validate()?;
        let simulator = TradingSimulator::new(config.to_trading_rule());
        let portfolio_manager = PortfolioManager::new(config.initial_cash, config.to_portfolio_config());
        Ok(Self {
            config,
            simulator,
            order_manager: OrderManager::new(),
            portfolio_manager,
            strategy: None,
            calendar: TradingCalendar::default(),
            market_data: BTreeMap::new(),
            state: EngineState::Idle,
            realtime_callback: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Every trade executed so far, oldest first.
    pub fn trades(&self) -> &[ashq_schemas::Trade] {
        self.order_manager.trades()
    }

    /// Register a strategy and call its `initialize` hook, passing it a
    /// context object built from the engine's own config.
    pub fn set_strategy(&mut self, mut strategy: Box<dyn Strategy>) -> Result<(), BacktestError> {
        self.require_state(EngineState::Idle)?;
        let ctx = StrategyContext::new(self.config.initial_cash, self.config.start_date, self.config.end_date);
        strategy.initialize(&ctx);
        self.strategy = Some(strategy);
        self.state = EngineState::Ready;
        Ok(())
    }

    pub fn set_realtime_callback(&mut self, callback: RealtimeCallback) {
        self.realtime_callback = Some(callback);
    }

    /// Load market data for `symbols` (or the strategy's declared index
    /// universe if `symbols` is `None`), ranked/truncated by the
    /// strategy's scoring hook if it exposes one, otherwise stratified
    /// sampling.
    pub fn load_data(
        &mut self,
        data_manager: &dyn DataManager,
        symbols: Option<&[Symbol]>,
        max_symbols: Option<usize>,
    ) -> Result<(), BacktestError> {
        self.require_state(EngineState::Ready)?;
        let strategy = self.strategy.as_ref().ok_or(BacktestError::NoStrategy)?;

        let universe: Vec<Symbol> = match symbols {
            Some(s) => s.to_vec(),
            None => {
                let index_code = strategy.index_code().ok_or_else(|| {
                    BacktestError::Data("no symbols given and strategy exposes no index_code".to_string())
                })?;
                data_manager
                    .load_universe(&index_code)
                    .map_err(|e| BacktestError::Data(e.to_string()))?
            }
        };

        let loaded = if strategy.has_scoring_hook() {
            let scorer = |s: &Symbol, b: &ashq_schemas::DailyBar| strategy.score_for_selection(s, b).unwrap_or(f64::MIN);
            data_manager
                .load_market(&universe, self.config.start_date, self.config.end_date, max_symbols, Some(&scorer))
                .map_err(|e| BacktestError::Data(e.to_string()))?
        } else {
            data_manager
                .load_market(&universe, self.config.start_date, self.config.end_date, max_symbols, None)
                .map_err(|e| BacktestError::Data(e.to_string()))?
        };

        self.market_data = loaded.market_data;
        self.calendar = loaded.trading_dates;
        self.state = EngineState::Armed;
        Ok(())
    }

    /// Run the full trading-day loop to completion.
    pub fn run(&mut self) -> Result<BacktestRunResult, BacktestError> {
        self.require_state(EngineState::Armed)?;
        if self.market_data.is_empty() {
            self.state = EngineState::Errored;
            return Err(BacktestError::NoMarketData);
        }
        self.state = EngineState::Running;

        let dates: Vec<NaiveDate> = self.calendar.dates().to_vec();
        for date in dates {
            if let Err(err) = self.run_one_day(date) {
                self.state = EngineState::Errored;
                return Err(err);
            }
        }

        self.state = EngineState::Done;
        Ok(self.compile_result())
    }

    fn run_one_day(&mut self, date: NaiveDate) -> Result<(), BacktestError> {
        let market_day = project_market_day(&self.market_data, date);

        self.portfolio_manager.mark_to_market(&market_day, date);
        let violations = self.portfolio_manager.risk_check(date);
        self.queue_forced_sells(date, &violations, &market_day);

        let portfolio_summary = self.portfolio_manager.get_portfolio_summary();
        let strategy = self.strategy.as_mut().ok_or(BacktestError::NoStrategy)?;
        let signals = match catch_unwind(AssertUnwindSafe(|| {
            strategy.generate_signals(date, &market_day, &portfolio_summary)
        })) {
            Ok(signals) => signals,
            Err(payload) => {
                return Err(BacktestError::StrategyPanic { date, message: panic_message(payload) });
            }
        };

        self.queue_signal_orders(date, signals);

        let trades = self
            .order_manager
            .execute_pending(date, &market_day, &self.calendar, &self.simulator);
        for trade in &trades {
            self.portfolio_manager.apply_trade(trade);
            self.strategy.as_mut().expect("checked above").on_trade_executed(trade);
        }

        self.portfolio_manager.snapshot(date);

        if let Some(callback) = self.realtime_callback.as_mut() {
            let summary = self.portfolio_manager.get_portfolio_summary();
            callback(&RealtimeUpdate { date, portfolio_summary: &summary, trades: &trades });
        }

        Ok(())
    }

    /// Queues at most one forced-sell order per symbol per day, in
    /// stop-loss > take-profit > concentration precedence order as
    /// already enforced by `PortfolioManager::risk_check`. A SELL
    /// rejected for limit-down simply leaves the position in place;
    /// `risk_check` re-evaluates it again the next trading day.
    fn queue_forced_sells(
        &mut self,
        date: NaiveDate,
        violations: &[ashq_portfolio::RiskViolation],
        market_day: &MarketDay,
    ) {
        let mut queued_today: BTreeSet<Symbol> = BTreeSet::new();
        for violation in violations {
            let Some(symbol) = &violation.symbol else { continue };
            if !queued_today.insert(symbol.clone()) {
                continue;
            }
            let Some(bar) = market_day.get(symbol) else { continue };
            let Some(position) = self.portfolio_manager.positions().get(symbol) else { continue };
            self.order_manager.create_order(symbol.clone(), Side::Sell, position.qty, bar.close, date);
        }
    }

    fn queue_signal_orders(&mut self, date: NaiveDate, signals: Vec<Signal>) {
        for signal in signals {
            match signal.action {
                SignalAction::Buy => {
                    if !self.portfolio_manager.can_open_new() {
                        continue;
                    }
                    let weight = signal.weight.unwrap_or(0.0);
                    if weight <= 0.0 {
                        continue;
                    }
                    let qty = self.portfolio_manager.size_position(weight, signal.price);
                    if qty <= 0 {
                        continue;
                    }
                    self.order_manager.create_order(signal.symbol, Side::Buy, qty, signal.price, date);
                }
                SignalAction::Sell => {
                    let Some(position) = self.portfolio_manager.positions().get(&signal.symbol) else { continue };
                    let qty = signal.qty.unwrap_or(position.qty).min(position.qty);
                    if qty <= 0 {
                        continue;
                    }
                    self.order_manager.create_order(signal.symbol, Side::Sell, qty, signal.price, date);
                }
            }
        }
    }

    fn compile_result(&self) -> BacktestRunResult {
        let benchmark = self.compute_benchmark();
        let benchmark_returns: Option<Vec<f64>> =
            benchmark.as_ref().map(|series| series.points.iter().map(|p| p.value).collect());

        let performance = PerformanceAnalyzer::analyze(
            self.portfolio_manager.snapshots(),
            self.order_manager.trades(),
            benchmark_returns.as_deref(),
        );
        let chart_data = PerformanceAnalyzer::chart_data(self.portfolio_manager.snapshots(), benchmark);

        BacktestRunResult {
            config: self.config.clone(),
            strategy_info: self.strategy.as_ref().map(|s| s.strategy_info()).unwrap_or_default(),
            performance,
            portfolio_summary: self.portfolio_manager.get_portfolio_summary(),
            trading_summary: self.order_manager.trading_summary(),
            chart_data,
        }
    }

    /// Uses the configured benchmark's own observed returns if its
    /// symbol happens to be present in the loaded market data;
    /// otherwise synthesizes a clearly-flagged series from the engine's
    /// seed.
    fn compute_benchmark(&self) -> Option<BenchmarkSeries> {
        let dates = self.calendar.dates();
        if dates.is_empty() {
            return None;
        }

        if let Some(frame) = self.market_data.get(&self.config.benchmark) {
            let mut observed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            let mut prev_close: Option<f64> = None;
            for &date in dates {
                if let Some(bar) = bar_on(frame, date) {
                    if let Some(prev) = prev_close {
                        if prev != 0.0 {
                            observed.insert(date, (bar.close - prev) / prev);
                        }
                    }
                    prev_close = Some(bar.close);
                }
            }
            Some(align_benchmark(self.config.benchmark.clone(), dates, &observed))
        } else {
            Some(synthesize_benchmark(
                self.config.benchmark.clone(),
                dates,
                BENCHMARK_SYNTH_MEAN_DAILY_RETURN,
                BENCHMARK_SYNTH_DAILY_VOLATILITY,
                self.config.seed,
            ))
        }
    }

    /// Returns every part of the engine to its pre-`set_strategy` state.
    pub fn reset(&mut self) {
        self.order_manager.clear_history();
        self.portfolio_manager.reset();
        self.market_data.clear();
        self.calendar = TradingCalendar::default();
        self.strategy = None;
        self.state = EngineState::Idle;
    }

    fn require_state(&self, expected: EngineState) -> Result<(), BacktestError> {
        if self.state != expected {
            return Err(BacktestError::InvalidState { expected, actual: self.state });
        }
        Ok(())
    }
}

fn project_market_day(market_data: &BTreeMap<Symbol, ashq_data::DailyFrame>, date: NaiveDate) -> MarketDay {
    market_data
        .iter()
        .filter_map(|(symbol, frame)| frame.get(&date).map(|bar| (symbol.clone(), bar.clone())))
        .collect()
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "strategy panicked with a non-string payload".to_string()
    }
}
