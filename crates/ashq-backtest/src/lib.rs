//! ashq-backtest
//!
//! The event-driven engine that ties market data, the A-share trading
//! simulator, order/portfolio bookkeeping, and performance analysis
//! into a single per-day run loop, plus deterministic artifact
//! persistence for a completed run.

mod artifacts;
mod engine;
mod result;

pub use artifacts::{write_run_artifacts, ArtifactPaths};
pub use engine::{BacktestEngine, BacktestError, EngineState, RealtimeUpdate};
pub use result::BacktestRunResult;
