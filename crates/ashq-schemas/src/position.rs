use chrono::NaiveDate;

use crate::Symbol;

/// A held position. `qty` is always >= 0 (no short selling); `qty > 0`
/// implies `avg_cost > 0`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    pub qty: i64,
    pub avg_cost: f64,
    pub market_value: f64,
    pub unrealized_pnl: f64,
    pub unrealized_pnl_pct: f64,
    pub entry_date: NaiveDate,
    pub last_update: NaiveDate,
}

impl Position {
    pub fn new(symbol: impl Into<Symbol>, qty: i64, avg_cost: f64, entry_date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            qty,
            avg_cost,
            market_value: qty as f64 * avg_cost,
            unrealized_pnl: 0.0,
            unrealized_pnl_pct: 0.0,
            entry_date,
            last_update: entry_date,
        }
    }

    /// Re-mark this position against a close price, as
    /// `PortfolioManager.markToMarket` does for every held symbol
    /// present in the day's `MarketDay`.
    pub fn mark(&mut self, close: f64, date: NaiveDate) {
        self.market_value = self.qty as f64 * close;
        self.unrealized_pnl = (close - self.avg_cost) * self.qty as f64;
        self.unrealized_pnl_pct = if self.avg_cost > 0.0 && self.qty > 0 {
            self.unrealized_pnl / (self.avg_cost * self.qty as f64)
        } else {
            0.0
        };
        self.last_update = date;
    }
}
