use ashq_schemas::{DailyBar, MarketDay, Symbol, Trade};
use ashq_portfolio::PortfolioSummary;
use chrono::NaiveDate;

use crate::context::{StrategyContext, StrategyInfo};
use crate::signal::Signal;

/// What the engine consumes. Optional capabilities (`index_code`,
/// `score_for_selection`) are discovered via default trait methods
/// rather than duck typing.
pub trait Strategy {
    /// Called once before the run starts.
    fn initialize(&mut self, ctx: &StrategyContext);

    /// Pure w.r.t. the values it receives: must not mutate `market_day`
    /// or `portfolio_summary`, and may only read its own internal state.
    fn generate_signals(
        &mut self,
        date: NaiveDate,
        market_day: &MarketDay,
        portfolio_summary: &PortfolioSummary,
    ) -> Vec<Signal>;

    /// Post-fill notification; no return value expected.
    fn on_trade_executed(&mut self, trade: &Trade);

    /// Metadata used by reporting: name, version, knobs, counters.
    fn strategy_info(&self) -> StrategyInfo;

    /// Optional benchmark symbol for universe loading.
    fn index_code(&self) -> Option<String> {
        None
    }

    /// Optional hook used by the data loader to rank the universe.
    fn score_for_selection(&self, _symbol: &Symbol, _bar: &DailyBar) -> Option<f64> {
        None
    }

    /// Whether `score_for_selection` is actually wired up for this
    /// strategy. The data loader uses this (rather than probing
    /// `score_for_selection` against sample data) to decide between
    /// top-K ranking and stratified sampling.
    fn has_scoring_hook(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Minimal fixture exercising the trait's default methods.
    struct NoOpStrategy {
        initialized: bool,
    }

    impl Strategy for NoOpStrategy {
        fn initialize(&mut self, _ctx: &StrategyContext) {
            self.initialized = true;
        }

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
                version: "0.1.0".to_string(),
                knobs: BTreeMap::new(),
                counters: BTreeMap::new(),
            }
        }
    }

    #[test]
    fn default_optional_hooks_return_none() {
        let s = NoOpStrategy { initialized: false };
        assert!(s.index_code().is_none());
        assert!(s
            .score_for_selection(&"000001.SZ".to_string(), &DailyBar::new(1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0))
            .is_none());
    }

    #[test]
    fn initialize_runs_once_and_sets_state() {
        let mut s = NoOpStrategy { initialized: false };
        let ctx = StrategyContext::new(
            1_000_000.0,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        s.initialize(&ctx);
        assert!(s.initialized);
    }
}
