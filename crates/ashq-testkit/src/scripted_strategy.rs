use std::collections::BTreeMap;

use ashq_portfolio::PortfolioSummary;
use ashq_schemas::{DailyBar, MarketDay, Symbol, Trade};
use ashq_strategy::{Signal, Strategy, StrategyContext, StrategyInfo};
use chrono::NaiveDate;

/// A `Strategy` whose signals are scripted ahead of time rather than
/// computed, for driving the engine through an exact, known sequence of
/// orders in integration tests. Unscripted dates produce no signals.
#[derive(Debug, Default)]
pub struct ScriptedStrategy {
    script: BTreeMap<NaiveDate, Vec<Signal>>,
    pub initialized_with: Option<StrategyContext>,
    pub executed_trades: Vec<Trade>,
}

impl ScriptedStrategy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, date: NaiveDate, signals: Vec<Signal>) -> Self {
        self.script.entry(date).or_default().extend(signals);
        self
    }
}

impl Strategy for ScriptedStrategy {
    fn initialize(&mut self, ctx: &StrategyContext) {
        self.initialized_with = Some(ctx.clone());
    }

    fn generate_signals(
        &mut self,
        date: NaiveDate,
        _market_day: &MarketDay,
        _portfolio_summary: &PortfolioSummary,
    ) -> Vec<Signal> {
        self.script.get(&date).cloned().unwrap_or_default()
    }

    fn on_trade_executed(&mut self, trade: &Trade) {
        self.executed_trades.push(trade.clone());
    }

    fn strategy_info(&self) -> StrategyInfo {
        StrategyInfo {
            name: "scripted".to_string(),
            version: "test".to_string(),
            knobs: BTreeMap::new(),
            counters: BTreeMap::new(),
        }
    }
}

/// A strategy that never emits a signal; useful for exercising the
/// engine's forced-sell and mark-to-market paths in isolation.
#[derive(Debug, Default)]
pub struct NoOpStrategy;

impl Strategy for NoOpStrategy {
    fn initialize(&mut self, _ctx: &StrategyContext) {}

    fn generate_signals(
        &mut self,
        _date: NaiveDate,
        _market_day: &MarketDay,
        _portfolio_summary: &PortfolioSummary,
    ) -> Vec<Signal> {
        Vec::new()
    }

    fn on_trade_executed(&mut self, _trade: &Trade) {}

    fn strategy_info(&self) -> StrategyInfo {
        StrategyInfo {
            name: "noop".to_string(),
            version: "test".to_string(),
            knobs: BTreeMap::new(),
            counters: BTreeMap::new(),
        }
    }
}

/// A strategy that scores every symbol by its bar's `close` (descending),
/// for exercising the engine's top-K universe-ranking path.
#[derive(Debug, Default)]
pub struct ScoreByCloseStrategy;

impl Strategy for ScoreByCloseStrategy {
    fn initialize(&mut self, _ctx: &StrategyContext) {}

    fn generate_signals(
        &mut self,
        _date: NaiveDate,
        _market_day: &MarketDay,
        _portfolio_summary: &PortfolioSummary,
    ) -> Vec<Signal> {
        Vec::new()
    }

    fn on_trade_executed(&mut self, _trade: &Trade) {}

    fn strategy_info(&self) -> StrategyInfo {
        StrategyInfo::default()
    }

    fn score_for_selection(&self, _symbol: &Symbol, bar: &DailyBar) -> Option<f64> {
        Some(bar.close)
    }

    fn has_scoring_hook(&self) -> bool {
        true
    }
}
