use chrono::NaiveDate;

use crate::Symbol;

/// Order direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

/// Only `Pending`/`Executed`/`Rejected`/`Cancelled` are produced today,
/// since every order fills all-or-nothing at the close price; `Partial`
/// exists so the type can grow into partial fills without a breaking
/// change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OrderStatus {
    Pending,
    Executed,
    Rejected,
    Cancelled,
    Partial,
}

/// Mutable until terminal (any status other than `Pending`); once
/// terminal, no field changes again.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Order {
    pub id: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub requested_qty: i64,
    pub requested_price: f64,
    pub timestamp: NaiveDate,
    pub status: OrderStatus,
    pub executed_qty: i64,
    pub executed_price: f64,
    pub commission: f64,
    pub stamp_tax: f64,
    pub transfer_fee: f64,
    pub reject_reason: Option<String>,
}

impl Order {
    pub fn new_pending(
        id: u64,
        symbol: impl Into<Symbol>,
        side: Side,
        requested_qty: i64,
        requested_price: f64,
        timestamp: NaiveDate,
    ) -> Self {
        Self {
            id,
            symbol: symbol.into(),
            side,
            requested_qty,
            requested_price,
            timestamp,
            status: OrderStatus::Pending,
            executed_qty: 0,
            executed_price: 0.0,
            commission: 0.0,
            stamp_tax: 0.0,
            transfer_fee: 0.0,
            reject_reason: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, OrderStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }

    /// Mark this order rejected with `reason`. Caller must ensure the
    /// order is still pending; rejecting a terminal order would violate
    /// the "no field mutated after terminal" invariant.
    pub fn reject(&mut self, reason: impl Into<String>) {
        debug_assert!(self.is_pending(), "rejecting a non-pending order");
        self.status = OrderStatus::Rejected;
        self.reject_reason = Some(reason.into());
    }

    /// Mark this order filled at `executed_price` for the full requested
    /// quantity (baseline: no partial fills), with the given fee
    /// components.
    pub fn fill(&mut self, executed_price: f64, commission: f64, stamp_tax: f64, transfer_fee: f64) {
        debug_assert!(self.is_pending(), "filling a non-pending order");
        self.status = OrderStatus::Executed;
        self.executed_qty = self.requested_qty;
        self.executed_price = executed_price;
        self.commission = commission;
        self.stamp_tax = stamp_tax;
        self.transfer_fee = transfer_fee;
    }

    pub fn cancel(&mut self, reason: impl Into<String>) {
        debug_assert!(self.is_pending(), "cancelling a non-pending order");
        self.status = OrderStatus::Cancelled;
        self.reject_reason = Some(reason.into());
    }
}
