//! ashq-perf
//!
//! Derives return/risk statistics and chart-ready time series from a
//! portfolio's snapshot history and trade log. Pure and deterministic:
//! no IO, no wall-clock, no OS randomness — the synthetic benchmark
//! fallback takes its randomness from an explicit seed instead.

mod advanced;
mod analyzer;
mod basic;
mod benchmark;
mod charts;
mod report;
mod stats;
mod trade_metrics;

pub use analyzer::PerformanceAnalyzer;
pub use benchmark::{align_benchmark, synthesize_benchmark, DEFAULT_SEED};
pub use report::{
    AdvancedMetrics, BasicMetrics, BenchmarkSeries, ChartData, EquityPoint, PerformanceReport,
    RelativeMetrics, SeriesPoint, TradeMetrics,
};
