use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ashq_backtest::{write_run_artifacts, BacktestEngine};
use ashq_config::{apply_env_overrides, load_layered_yaml};
use ashq_data::CsvDataManager;
use ashq_schemas::{DailyBar, MarketDay, Symbol, Trade};
use ashq_strategy::{Signal, Strategy, StrategyContext, StrategyInfo};
use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};

#[derive(Args)]
pub struct RunArgs {
    /// Layered config YAML paths, in merge order (defaults -> overrides).
    #[arg(long = "config", required = true)]
    config_paths: Vec<String>,

    /// Directory holding `<symbol>.csv` daily bar files.
    #[arg(long)]
    data_dir: PathBuf,

    /// Directory holding `<index_code>.csv` universe membership files.
    #[arg(long, default_value = "universe")]
    universe_dir: PathBuf,

    /// Explicit symbol universe, comma-separated. Required unless the
    /// chosen strategy declares its own `index_code()`.
    #[arg(long, value_delimiter = ',')]
    symbols: Option<Vec<Symbol>>,

    /// Cap the loaded universe to this many symbols.
    #[arg(long)]
    max_symbols: Option<usize>,

    /// Built-in reference strategy to drive the run with. Strategy
    /// implementations are a collaborator outside this workspace's
    /// scope; this is a minimal stand-in for exercising the engine end
    /// to end, not a production strategy.
    #[arg(long, value_enum, default_value_t = DemoStrategyKind::BuyHold)]
    strategy: DemoStrategyKind,

    /// Target weight per position for the buy-and-hold demo strategy.
    #[arg(long, default_value_t = 0.1)]
    weight: f64,
}

#[derive(Clone, Copy, ValueEnum)]
enum DemoStrategyKind {
    /// Never trades; useful for exercising mark-to-market/risk/snapshot alone.
    NoOp,
    /// Buys every symbol once at `weight` on its first available day and holds.
    BuyHold,
}

pub fn run(args: RunArgs) -> Result<()> {
    let path_refs: Vec<&str> = args.config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml(&path_refs).context("loading layered backtest config")?;
    let mut config = loaded.config;
    apply_env_overrides(&mut config).context("applying ASHQ_* env overrides")?;

    tracing::info!(config_hash = %loaded.config_hash, "loaded backtest config");

    let data_manager = CsvDataManager::new(args.data_dir.clone(), args.universe_dir.clone());

    let mut engine = BacktestEngine::new(config).context("constructing backtest engine")?;

    let strategy: Box<dyn Strategy> = match args.strategy {
        DemoStrategyKind::NoOp => Box::new(NoOpDemoStrategy),
        DemoStrategyKind::BuyHold => Box::new(BuyAndHoldDemoStrategy::new(args.weight)),
    };
    engine.set_strategy(strategy).context("registering strategy")?;

    engine
        .load_data(&data_manager, args.symbols.as_deref(), args.max_symbols)
        .context("loading market data")?;

    let result = engine.run().context("running backtest")?;

    tracing::info!(
        total_return = result.performance.basic.total_return,
        sharpe = result.performance.basic.sharpe,
        trades = result.trading_summary.total_trades,
        "backtest complete"
    );

    let run_timestamp = Utc::now().format("%Y%m%dT%H%M%SZ").to_string();
    let output_dir = result.config.output_dir.clone();
    let paths = write_run_artifacts(&output_dir, &run_timestamp, &result, engine.trades())
        .context("writing run artifacts")?;

    println!("run_dir={}", paths.run_dir.display());
    println!("result_json={}", paths.result_json.display());
    println!("total_return={:.4}", result.performance.basic.total_return);
    println!("sharpe={:.4}", result.performance.basic.sharpe);
    println!("max_drawdown={:.4}", result.performance.basic.max_drawdown);
    println!("total_trades={}", result.trading_summary.total_trades);

    Ok(())
}

/// Never emits a signal; exercises the engine's forced-sell and
/// mark-to-market paths in isolation.
struct NoOpDemoStrategy;

impl Strategy for NoOpDemoStrategy {
    fn initialize(&mut self, _ctx: &StrategyContext) {}

    fn generate_signals(
        &mut self,
        _date: NaiveDate,
        _market_day: &MarketDay,
        _portfolio_summary: &ashq_portfolio::PortfolioSummary,
    ) -> Vec<Signal> {
        Vec::new()
    }

    fn on_trade_executed(&mut self, _trade: &Trade) {}

    fn strategy_info(&self) -> StrategyInfo {
        StrategyInfo { name: "noop".to_string(), version: "1.0.0".to_string(), ..Default::default() }
    }
}

/// Buys every symbol it has not already opened a position in, at
/// `weight` of total portfolio value, the first day it sees that
/// symbol's bar; never sells (the engine's own risk checks are the
/// only source of exits). A minimal, honest reference implementation
/// of the `Strategy` trait — not a production signal generator.
struct BuyAndHoldDemoStrategy {
    weight: f64,
    bought: BTreeMap<Symbol, bool>,
}

impl BuyAndHoldDemoStrategy {
    fn new(weight: f64) -> Self {
        Self { weight, bought: BTreeMap::new() }
    }
}

impl Strategy for BuyAndHoldDemoStrategy {
    fn initialize(&mut self, _ctx: &StrategyContext) {}

    fn generate_signals(
        &mut self,
        _date: NaiveDate,
        market_day: &MarketDay,
        portfolio_summary: &ashq_portfolio::PortfolioSummary,
    ) -> Vec<Signal> {
        let mut signals = Vec::new();
        for (symbol, bar) in market_day {
            if self.bought.contains_key(symbol) || portfolio_summary.positions.contains_key(symbol) {
                continue;
            }
            if let Ok(signal) = Signal::buy(symbol.clone(), bar.close, self.weight) {
                self.bought.insert(symbol.clone(), true);
                signals.push(signal);
            }
        }
        signals
    }

    fn on_trade_executed(&mut self, _trade: &Trade) {}

    fn strategy_info(&self) -> StrategyInfo {
        StrategyInfo { name: "buy_hold".to_string(), version: "1.0.0".to_string(), ..Default::default() }
    }

    fn score_for_selection(&self, _symbol: &Symbol, bar: &DailyBar) -> Option<f64> {
        Some(bar.amount)
    }

    fn has_scoring_hook(&self) -> bool {
        true
    }
}
