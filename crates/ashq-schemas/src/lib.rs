//! ashq-schemas
//!
//! Shared data model for the A-share backtesting engine: symbols, daily
//! bars, the trading calendar, orders, trades, positions, and snapshots.
//! Every other crate in the workspace depends on these types rather than
//! defining its own copies, so that the engine's invariants (cash
//! conservation, non-negative positions, buy-unit multiples, ...) are
//! expressed once.

mod bar;
mod calendar;
mod fixedpoint;
mod order;
mod position;
mod snapshot;
mod trade;

pub use bar::{DailyBar, MarketDay};
pub use calendar::TradingCalendar;
pub use fixedpoint::round2;
pub use order::{Order, OrderStatus, Side};
pub use position::Position;
pub use snapshot::PortfolioSnapshot;
pub use trade::Trade;

/// Opaque symbol id, e.g. `"600519.SH"` or `"000001.SZ"`.
pub type Symbol = String;

/// `true` if `symbol` carries Shanghai Stock Exchange suffix `.SH`.
pub fn is_shanghai(symbol: &str) -> bool {
    symbol.ends_with(".SH")
}

/// `true` if `symbol`'s name marks it as "special treatment" (ST), which
/// trades under the tighter ±5% daily limit. The data model does not
/// carry an explicit ST field, so this is derived from the convention
/// that ST issuers embed "ST" in their display code.
pub fn is_st(symbol: &str) -> bool {
    symbol.to_ascii_uppercase().contains("ST")
}
