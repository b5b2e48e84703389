//! ashq-orders
//!
//! Order lifecycle management: holds pending/executed orders, invokes
//! the trading simulator, and produces immutable Trade records.

mod manager;

pub use manager::{OrderManager, TradingSummary};
