use chrono::NaiveDate;

use crate::{Side, Symbol};

/// One immutable record per `Executed` order. `net_cash_delta`'s sign
/// convention: BUY is negative (cash leaves the account), SELL is
/// positive. `transfer_fee` is folded into `net_cash_delta` for both
/// sides but, per the open-question resolution in DESIGN.md, is not
/// accumulated into `commission`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trade {
    pub id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub qty: i64,
    pub price: f64,
    pub commission: f64,
    pub stamp_tax: f64,
    pub transfer_fee: f64,
    pub net_cash_delta: f64,
    pub trade_date: NaiveDate,
}
