use std::collections::BTreeMap;

use ashq_data::DailyFrame;
use ashq_schemas::{DailyBar, Symbol, TradingCalendar};
use chrono::NaiveDate;

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid fixture date")
}

pub fn calendar(dates: &[&str]) -> TradingCalendar {
    TradingCalendar::new(dates.iter().map(|d| date(d)).collect())
}

/// A bar with identical open/high/low/close, `pre_close` set to
/// `prev_close`, and unremarkable volume/amount. Handy when a test only
/// cares about price level, not intraday shape.
pub fn flat_bar(close: f64, prev_close: f64) -> DailyBar {
    DailyBar::new(close, close, close, close, prev_close, 1_000.0, close * 1_000.0)
}

pub fn suspended_bar(prev_close: f64) -> DailyBar {
    flat_bar(prev_close, prev_close).suspended()
}

/// Builds a deterministic, linearly-compounding price path for one
/// symbol: `close_n = start_price * (1 + daily_return)^n`, each day's
/// `pre_close` set to the prior day's close.
pub fn synthetic_frame(dates: &[NaiveDate], start_price: f64, daily_return: f64) -> DailyFrame {
    let mut frame = DailyFrame::new();
    let mut prev_close = start_price;
    for &d in dates {
        let close = prev_close * (1.0 + daily_return);
        frame.insert(d, flat_bar(close, prev_close));
        prev_close = close;
    }
    frame
}

/// A multi-symbol market built from `synthetic_frame`, each symbol
/// offset by a distinct `daily_return` so test assertions can tell them
/// apart.
pub fn synthetic_market(
    symbols_and_returns: &[(&str, f64)],
    dates: &[NaiveDate],
    start_price: f64,
) -> BTreeMap<Symbol, DailyFrame> {
    symbols_and_returns
        .iter()
        .map(|(symbol, daily_return)| {
            (symbol.to_string(), synthetic_frame(dates, start_price, *daily_return))
        })
        .collect()
}
