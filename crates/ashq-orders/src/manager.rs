use std::collections::{BTreeMap, BTreeSet};

use ashq_schemas::{MarketDay, Order, OrderStatus, Side, TradingCalendar, Trade};
use ashq_sim::TradingSimulator;
use chrono::NaiveDate;

/// Fee totals and counts, by side, across every trade recorded so far.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TradingSummary {
    pub total_trades: usize,
    pub buy_trades: usize,
    pub sell_trades: usize,
    pub total_commission: f64,
    pub total_stamp_tax: f64,
    pub total_transfer_fee: f64,
}

/// Holds pending/executed orders and the trade log they produce.
///
/// Invariant: `pending`, `executed`, and `terminal_other` are pairwise
/// disjoint and their union is exactly the key set of `orders_by_id`.
#[derive(Debug, Clone, Default)]
pub struct OrderManager {
    next_order_id: u64,
    next_trade_id: u64,
    orders_by_id: BTreeMap<u64, Order>,
    pending: BTreeSet<u64>,
    executed: BTreeSet<u64>,
    terminal_other: BTreeSet<u64>,
    trades: Vec<Trade>,
}

impl OrderManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a PENDING order, collapsing an exact duplicate already in
    /// `pending` (same symbol, side, qty, and price within 0.01) into
    /// the existing order's id instead of creating a new one.
    pub fn create_order(
        &mut self,
        symbol: impl Into<String>,
        side: Side,
        qty: i64,
        price: f64,
        ts: NaiveDate,
    ) -> u64 {
        let symbol = symbol.into();

        for &id in &self.pending {
            let existing = &self.orders_by_id[&id];
            if existing.symbol == symbol
                && existing.side == side
                && existing.requested_qty == qty
                && (existing.requested_price - price).abs() < 0.01
            {
                return id;
            }
        }

        let id = self.next_order_id;
        self.next_order_id += 1;
        let order = Order::new_pending(id, symbol, side, qty, price, ts);
        self.orders_by_id.insert(id, order);
        self.pending.insert(id);
        id
    }

    /// Run every pending order through `simulator` against `market_day`.
    /// Executed orders produce a `Trade` and move to `executed`;
    /// rejected orders move to `terminal_other`. Orders are processed in
    /// ascending id order (i.e. creation order) for determinism.
    pub fn execute_pending(
        &mut self,
        date: NaiveDate,
        market_day: &MarketDay,
        calendar: &TradingCalendar,
        simulator: &TradingSimulator,
    ) -> Vec<Trade> {
        let ids: Vec<u64> = self.pending.iter().copied().collect();
        let mut new_trades = Vec::new();

        for id in ids {
            self.pending.remove(&id);
            let order = self.orders_by_id.get_mut(&id).expect("pending id must exist");

            match simulator.execute(order, market_day, calendar) {
                Ok(net_cash_delta) => {
                    self.executed.insert(id);
                    let trade = Trade {
                        id: self.next_trade_id,
                        symbol: order.symbol.clone(),
                        side: order.side,
                        qty: order.executed_qty,
                        price: order.executed_price,
                        commission: order.commission,
                        stamp_tax: order.stamp_tax,
                        transfer_fee: order.transfer_fee,
                        net_cash_delta,
                        trade_date: date,
                    };
                    self.next_trade_id += 1;
                    self.trades.push(trade.clone());
                    new_trades.push(trade);
                }
                Err(_) => {
                    self.terminal_other.insert(id);
                }
            }
        }

        new_trades
    }

    /// Cancel every pending order with `reason`.
    pub fn cancel_all_pending(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        let ids: Vec<u64> = self.pending.iter().copied().collect();
        for id in ids {
            self.pending.remove(&id);
            self.terminal_other.insert(id);
            self.orders_by_id
                .get_mut(&id)
                .expect("pending id must exist")
                .cancel(reason.clone());
        }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn trades_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Trade> {
        self.trades
            .iter()
            .filter(|t| t.trade_date >= start && t.trade_date <= end)
            .collect()
    }

    pub fn trades_by_symbol(&self, symbol: &str) -> Vec<&Trade> {
        self.trades.iter().filter(|t| t.symbol == symbol).collect()
    }

    pub fn order(&self, id: u64) -> Option<&Order> {
        self.orders_by_id.get(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn trading_summary(&self) -> TradingSummary {
        let mut summary = TradingSummary::default();
        for t in &self.trades {
            summary.total_trades += 1;
            match t.side {
                Side::Buy => summary.buy_trades += 1,
                Side::Sell => summary.sell_trades += 1,
            }
            summary.total_commission += t.commission;
            summary.total_stamp_tax += t.stamp_tax;
            summary.total_transfer_fee += t.transfer_fee;
        }
        summary
    }

    /// Clear all order/trade history (used by `BacktestEngine::reset`).
    pub fn clear_history(&mut self) {
        *self = Self::default();
    }

    #[cfg(debug_assertions)]
    pub fn assert_partition_invariant(&self) {
        let mut seen = BTreeSet::new();
        for set in [&self.pending, &self.executed, &self.terminal_other] {
            for id in set {
                assert!(seen.insert(*id), "order id {id} present in more than one partition");
            }
        }
        assert_eq!(seen, self.orders_by_id.keys().copied().collect());
    }
}
