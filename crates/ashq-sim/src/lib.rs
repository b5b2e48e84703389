//! ashq-sim
//!
//! A-share trading-rule simulator: price-limit validation, fee
//! computation, slippage, and order execution. Pure and deterministic
//! — no IO, no wall clock, no randomness.

mod rules;
mod simulator;

pub use rules::TradingRule;
pub use simulator::{RejectReason, TradingSimulator};
