use std::collections::BTreeMap;

use ashq_schemas::{Side, Symbol, Trade};
use chrono::NaiveDate;

use crate::report::TradeMetrics;

const FALLBACK_AVG_HOLDING_PERIOD_DAYS: f64 = 30.0;

/// Trade-log-derived metrics. Average holding period pairs each
/// symbol's BUY/SELL trades FIFO by quantity, falling back to a fixed
/// constant only when no complete round trip exists in the trade log.
pub fn compute_trade_metrics(trades: &[Trade]) -> TradeMetrics {
    let total_trades = trades.len() as u64;
    let buy_trades = trades.iter().filter(|t| t.side == Side::Buy).count() as u64;
    let sell_trades = total_trades - buy_trades;

    let total_commission = trades.iter().map(|t| t.commission).sum();
    let total_stamp_tax = trades.iter().map(|t| t.stamp_tax).sum();

    let monthly_trade_frequency = match (trades.first(), trades.last()) {
        (Some(first), Some(last)) => {
            let span_days = (last.trade_date - first.trade_date).num_days().max(1) as f64;
            total_trades as f64 / (span_days / 30.0)
        }
        _ => 0.0,
    };

    let avg_holding_period_days = fifo_avg_holding_period(trades).unwrap_or(FALLBACK_AVG_HOLDING_PERIOD_DAYS);

    TradeMetrics {
        total_trades,
        buy_trades,
        sell_trades,
        total_commission,
        total_stamp_tax,
        monthly_trade_frequency,
        avg_holding_period_days,
    }
}

/// FIFO-pairs each symbol's BUYs against its SELLs by quantity,
/// splitting a trade across multiple pairings when quantities don't
/// line up 1:1, and averages the calendar-day gap between the opening
/// and matching closing leg of every completed pairing.
fn fifo_avg_holding_period(trades: &[Trade]) -> Option<f64> {
    let mut open_lots: BTreeMap<Symbol, Vec<(NaiveDate, i64)>> = BTreeMap::new();
    let mut gaps_days: Vec<i64> = Vec::new();

    for trade in trades {
        match trade.side {
            Side::Buy => {
                open_lots
                    .entry(trade.symbol.clone())
                    .or_default()
                    .push((trade.trade_date, trade.qty));
            }
            Side::Sell => {
                let mut remaining = trade.qty;
                if let Some(lots) = open_lots.get_mut(&trade.symbol) {
                    while remaining > 0 {
                        let Some((entry_date, lot_qty)) = lots.first_mut() else {
                            break;
                        };
                        let matched = remaining.min(*lot_qty);
                        gaps_days.push((trade.trade_date - *entry_date).num_days());
                        *lot_qty -= matched;
                        remaining -= matched;
                        if *lot_qty == 0 {
                            lots.remove(0);
                        }
                    }
                }
            }
        }
    }

    if gaps_days.is_empty() {
        None
    } else {
        Some(gaps_days.iter().sum::<i64>() as f64 / gaps_days.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(side: Side, symbol: &str, qty: i64, date: &str) -> Trade {
        Trade {
            id: 1,
            symbol: symbol.to_string(),
            side,
            qty,
            price: 10.0,
            commission: 5.0,
            stamp_tax: if side == Side::Sell { 1.0 } else { 0.0 },
            transfer_fee: 0.0,
            net_cash_delta: 0.0,
            trade_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        }
    }

    #[test]
    fn no_trades_yields_fallback_holding_period() {
        let m = compute_trade_metrics(&[]);
        assert_eq!(m.avg_holding_period_days, 30.0);
        assert_eq!(m.total_trades, 0);
    }

    #[test]
    fn single_round_trip_computes_exact_gap() {
        let trades = vec![
            trade(Side::Buy, "000001.SZ", 1000, "2024-01-02"),
            trade(Side::Sell, "000001.SZ", 1000, "2024-01-12"),
        ];
        let m = compute_trade_metrics(&trades);
        assert_eq!(m.avg_holding_period_days, 10.0);
        assert_eq!(m.buy_trades, 1);
        assert_eq!(m.sell_trades, 1);
    }

    #[test]
    fn partial_sell_splits_across_multiple_buy_lots() {
        let trades = vec![
            trade(Side::Buy, "000001.SZ", 500, "2024-01-02"),
            trade(Side::Buy, "000001.SZ", 500, "2024-01-05"),
            trade(Side::Sell, "000001.SZ", 1000, "2024-01-10"),
        ];
        let m = compute_trade_metrics(&trades);
        // gaps: 8 days (from 01-02) and 5 days (from 01-05) -> mean 6.5
        assert_eq!(m.avg_holding_period_days, 6.5);
    }

    #[test]
    fn fee_totals_sum_across_all_trades() {
        let trades = vec![
            trade(Side::Buy, "000001.SZ", 1000, "2024-01-02"),
            trade(Side::Sell, "000001.SZ", 1000, "2024-01-03"),
        ];
        let m = compute_trade_metrics(&trades);
        assert_eq!(m.total_commission, 10.0);
        assert_eq!(m.total_stamp_tax, 1.0);
    }
}
