use std::collections::BTreeMap;

use crate::Symbol;

/// Per-symbol, per-day OHLCV record plus whatever precomputed indicators
/// the data layer attached (moving averages, RSI, MACD, Bollinger bands,
/// KDJ, `volume_ma20`, `turnover_rate`, ...).
///
/// The source system carries indicators as heterogeneous dict keys on a
/// per-row basis; here they are a typed `f64` map so strategies request
/// what they need by name and handle absence explicitly instead of the
/// engine guessing a schema for every possible indicator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DailyBar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub pre_close: f64,
    pub volume: f64,
    pub amount: f64,
    /// Trading halted for the day; if true the symbol is excluded from
    /// order validation regardless of price-limit math.
    pub suspended: bool,
    /// Arbitrary precomputed indicators, keyed by name.
    #[serde(default)]
    pub indicators: BTreeMap<String, f64>,
}

impl DailyBar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, pre_close: f64, volume: f64, amount: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            pre_close,
            volume,
            amount,
            suspended: false,
            indicators: BTreeMap::new(),
        }
    }

    pub fn with_indicator(mut self, name: impl Into<String>, value: f64) -> Self {
        self.indicators.insert(name.into(), value);
        self
    }

    pub fn suspended(mut self) -> Self {
        self.suspended = true;
        self
    }

    /// Look up a named indicator; `None` if it was never attached for
    /// this bar.
    pub fn indicator(&self, name: &str) -> Option<f64> {
        self.indicators.get(name).copied()
    }
}

/// One trading day's universe of bars, keyed by symbol. `BTreeMap` keeps
/// iteration order stable across runs, which bit-identical replay
/// depends on whenever the engine iterates positions or market data in
/// bulk.
pub type MarketDay = BTreeMap<Symbol, DailyBar>;
