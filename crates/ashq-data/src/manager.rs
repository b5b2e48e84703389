use std::collections::BTreeMap;

use anyhow::Result;
use ashq_schemas::{DailyBar, Symbol, TradingCalendar};
use chrono::NaiveDate;

use crate::frame::DailyFrame;

/// What the core calls to obtain market data. The core depends only on
/// these calls; it never depends on a specific storage backend.
pub trait DataManager {
    /// Ordered list of symbols composing an index.
    fn load_universe(&self, index_code: &str) -> Result<Vec<Symbol>>;

    /// A dated, indexed sequence of `DailyBar`s for one symbol.
    fn load_symbol(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<DailyFrame>;

    /// `map<Symbol, DailyFrame>` plus the trading-day calendar implied
    /// by the union of loaded frames. If `scorer` is provided, the top
    /// `max_n` symbols by score are kept; otherwise all requested
    /// symbols (optionally truncated to `max_n` by stratified sampling
    /// over the symbol's code prefix) are kept.
    fn load_market(
        &self,
        symbols: &[Symbol],
        start: NaiveDate,
        end: NaiveDate,
        max_n: Option<usize>,
        scorer: Option<&dyn Fn(&Symbol, &DailyBar) -> f64>,
    ) -> Result<LoadedMarket>;
}

pub struct LoadedMarket {
    pub market_data: BTreeMap<Symbol, DailyFrame>,
    pub trading_dates: TradingCalendar,
}

/// Stratified-by-code-prefix sample, used when no scoring hook is
/// available. Deterministic: iterates symbols in sorted order and takes
/// every `ceil(n/max_n)`-th one so the sample spans the whole universe
/// rather than clustering on one prefix.
pub fn stratified_sample(symbols: &[Symbol], max_n: usize) -> Vec<Symbol> {
    if symbols.is_empty() || max_n == 0 || symbols.len() <= max_n {
        return symbols.to_vec();
    }
    let mut sorted = symbols.to_vec();
    sorted.sort();

    let stride = sorted.len() as f64 / max_n as f64;
    (0..max_n)
        .map(|i| {
            let idx = ((i as f64) * stride) as usize;
            sorted[idx.min(sorted.len() - 1)].clone()
        })
        .collect()
}

/// Keeps the top `max_n` symbols by `scorer(symbol, latest_bar)`,
/// descending. Ties break by symbol ascending for determinism.
pub fn score_and_rank(
    symbols: &[Symbol],
    latest_bar: impl Fn(&Symbol) -> Option<DailyBar>,
    scorer: &dyn Fn(&Symbol, &DailyBar) -> f64,
    max_n: usize,
) -> Vec<Symbol> {
    let mut scored: Vec<(Symbol, f64)> = symbols
        .iter()
        .filter_map(|s| latest_bar(s).map(|bar| (s.clone(), scorer(s, &bar))))
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.0.cmp(&b.0)));
    scored.into_iter().take(max_n).map(|(s, _)| s).collect()
}
