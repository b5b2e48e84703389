use ashq_schemas::{is_shanghai, is_st, round2, MarketDay, Order, Side, TradingCalendar};

use crate::rules::TradingRule;

/// Why an order failed validation. `Display` renders stable reason
/// strings so they can be persisted verbatim on `Order::reject_reason`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NonTradingDay,
    NoMarketData,
    Suspended,
    BuyQtyNotUnitMultiple,
    NonPositiveQty,
    LimitUp,
    LimitDown,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RejectReason::NonTradingDay => "non-trading day",
            RejectReason::NoMarketData => "no market data",
            RejectReason::Suspended => "suspended",
            RejectReason::BuyQtyNotUnitMultiple => "buy qty not multiple of unit",
            RejectReason::NonPositiveQty => "non-positive qty",
            RejectReason::LimitUp => "limit-up, cannot buy",
            RejectReason::LimitDown => "limit-down, cannot sell",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for RejectReason {}

/// A-share trading-rule simulator.
#[derive(Debug, Clone, Default)]
pub struct TradingSimulator {
    rule: TradingRule,
}

impl TradingSimulator {
    pub fn new(rule: TradingRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &TradingRule {
        &self.rule
    }

    /// Compute (limit_up, limit_down) against `pre_close`, rounded to
    /// two decimals (A-share price precision is CNY fen).
    pub fn calculate_limit_price(&self, pre_close: f64, is_st: bool) -> (f64, f64) {
        let limit_pct = if is_st { self.rule.st_limit_pct } else { self.rule.limit_pct };
        let limit_up = round2(pre_close * (1.0 + limit_pct));
        let limit_down = round2(pre_close * (1.0 - self.rule.limit_pct));
        (limit_up, limit_down)
    }

    /// Validate `order` against the day's market data and calendar.
    pub fn validate(
        &self,
        order: &Order,
        market_day: &MarketDay,
        calendar: &TradingCalendar,
    ) -> Result<(), RejectReason> {
        if !calendar.contains(order.timestamp) {
            return Err(RejectReason::NonTradingDay);
        }

        let bar = market_day.get(&order.symbol).ok_or(RejectReason::NoMarketData)?;

        if bar.suspended {
            return Err(RejectReason::Suspended);
        }

        let (limit_up, limit_down) = self.calculate_limit_price(bar.pre_close, is_st(&order.symbol));
        let eps = self.rule.limit_epsilon;

        match order.side {
            Side::Buy => {
                if order.requested_qty % self.rule.buy_unit != 0 {
                    return Err(RejectReason::BuyQtyNotUnitMultiple);
                }
                if order.requested_qty <= 0 {
                    return Err(RejectReason::NonPositiveQty);
                }
                if bar.close >= limit_up * (1.0 - eps) {
                    return Err(RejectReason::LimitUp);
                }
            }
            Side::Sell => {
                if order.requested_qty <= 0 {
                    return Err(RejectReason::NonPositiveQty);
                }
                if bar.close <= limit_down * (1.0 + eps) {
                    return Err(RejectReason::LimitDown);
                }
            }
        }

        Ok(())
    }

    /// Apply adverse slippage to a raw close price: BUY moves the fill
    /// price up, SELL moves it down. Rounded to two decimals.
    pub fn apply_slippage(&self, price: f64, side: Side) -> f64 {
        let slipped = match side {
            Side::Buy => price * (1.0 + self.rule.slippage_rate),
            Side::Sell => price * (1.0 - self.rule.slippage_rate),
        };
        round2(slipped)
    }

    /// Commission, stamp tax, and transfer fee for an executed trade of
    /// `executed_value` (= `executed_qty * executed_price`).
    pub fn calculate_fees(&self, side: Side, symbol: &str, executed_value: f64) -> (f64, f64, f64) {
        let commission = (executed_value * self.rule.commission_rate).max(self.rule.min_commission);

        let stamp_tax = match side {
            Side::Sell => executed_value * self.rule.stamp_tax_rate,
            Side::Buy => 0.0,
        };

        let transfer_fee = if is_shanghai(symbol) {
            (executed_value * self.rule.transfer_fee_rate).max(self.rule.transfer_fee_floor)
        } else {
            0.0
        };

        (commission, stamp_tax, transfer_fee)
    }

    /// Net cash impact of one fill, signed so BUY is negative and
    /// SELL is positive. `transfer_fee` is folded in on both sides.
    pub fn net_cash_delta(
        &self,
        side: Side,
        executed_value: f64,
        commission: f64,
        stamp_tax: f64,
        transfer_fee: f64,
    ) -> f64 {
        match side {
            Side::Buy => -(executed_value + commission + transfer_fee),
            Side::Sell => executed_value - commission - stamp_tax - transfer_fee,
        }
    }

    /// Validate and execute `order` in place against `market_day`. On
    /// rejection, `order` transitions to `Rejected` with the reason
    /// recorded; on success it transitions to `Executed` with fees and
    /// the slipped fill price recorded, and the net cash delta this
    /// fill produced is returned.
    pub fn execute(
        &self,
        order: &mut Order,
        market_day: &MarketDay,
        calendar: &TradingCalendar,
    ) -> Result<f64, RejectReason> {
        if let Err(reason) = self.validate(order, market_day, calendar) {
            order.reject(reason.to_string());
            return Err(reason);
        }

        let bar = &market_day[&order.symbol];
        let fill_price = self.apply_slippage(bar.close, order.side);
        let executed_value = order.requested_qty as f64 * fill_price;
        let (commission, stamp_tax, transfer_fee) =
            self.calculate_fees(order.side, &order.symbol, executed_value);

        order.fill(fill_price, commission, stamp_tax, transfer_fee);

        Ok(self.net_cash_delta(order.side, executed_value, commission, stamp_tax, transfer_fee))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashq_schemas::DailyBar;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn one_day_calendar() -> TradingCalendar {
        TradingCalendar::new(vec![d("2024-01-02")])
    }

    fn market(symbol: &str, bar: DailyBar) -> MarketDay {
        let mut m = BTreeMap::new();
        m.insert(symbol.to_string(), bar);
        m
    }

    #[test]
    fn limit_price_rounds_to_two_decimals() {
        let sim = TradingSimulator::default();
        let (up, down) = sim.calculate_limit_price(10.0, false);
        assert_eq!(up, 11.0);
        assert_eq!(down, 9.0);
    }

    #[test]
    fn st_limit_is_tighter() {
        let sim = TradingSimulator::default();
        let (up, down) = sim.calculate_limit_price(10.0, true);
        assert_eq!(up, 10.5);
        assert_eq!(down, 9.0); // limit_down always uses the regular -10% band
    }

    #[test]
    fn buy_rejected_on_limit_up() {
        let sim = TradingSimulator::default();
        let cal = one_day_calendar();
        let bar = DailyBar::new(11.0, 11.0, 11.0, 11.0, 10.0, 1_000.0, 11_000.0);
        let mkt = market("000001.SZ", bar);

        let order = Order::new_pending(1, "000001.SZ", Side::Buy, 100, 11.0, d("2024-01-02"));
        let err = sim.validate(&order, &mkt, &cal).unwrap_err();
        assert_eq!(err, RejectReason::LimitUp);
    }

    #[test]
    fn sell_rejected_on_limit_down() {
        let sim = TradingSimulator::default();
        let cal = one_day_calendar();
        let bar = DailyBar::new(9.0, 9.0, 9.0, 9.0, 10.0, 1_000.0, 9_000.0);
        let mkt = market("000001.SZ", bar);

        let order = Order::new_pending(1, "000001.SZ", Side::Sell, 100, 9.0, d("2024-01-02"));
        let err = sim.validate(&order, &mkt, &cal).unwrap_err();
        assert_eq!(err, RejectReason::LimitDown);
    }

    #[test]
    fn buy_qty_must_be_unit_multiple() {
        let sim = TradingSimulator::default();
        let cal = one_day_calendar();
        let bar = DailyBar::new(10.0, 10.2, 9.8, 10.0, 10.0, 1_000.0, 10_000.0);
        let mkt = market("000001.SZ", bar);

        let order = Order::new_pending(1, "000001.SZ", Side::Buy, 150, 10.0, d("2024-01-02"));
        let err = sim.validate(&order, &mkt, &cal).unwrap_err();
        assert_eq!(err, RejectReason::BuyQtyNotUnitMultiple);
    }

    #[test]
    fn commission_floors_at_minimum() {
        let sim = TradingSimulator::default();
        let (commission, stamp_tax, transfer_fee) = sim.calculate_fees(Side::Buy, "000001.SZ", 1_000.0);
        assert_eq!(commission, 5.00); // 1000*0.0001 = 0.10, floored to 5.00
        assert_eq!(stamp_tax, 0.0);
        assert_eq!(transfer_fee, 0.0); // not a .SH symbol
    }

    #[test]
    fn sell_charges_stamp_tax_and_no_transfer_fee_off_sh() {
        let sim = TradingSimulator::default();
        let (_, stamp_tax, transfer_fee) = sim.calculate_fees(Side::Sell, "000001.SZ", 100_000.0);
        assert_eq!(stamp_tax, 100.0); // 100000*0.001
        assert_eq!(transfer_fee, 0.0);
    }

    #[test]
    fn sh_symbol_charges_floored_transfer_fee() {
        let sim = TradingSimulator::default();
        let (_, _, transfer_fee) = sim.calculate_fees(Side::Buy, "600519.SH", 10_000.0);
        // 10000*0.00002 = 0.20, floored to 1.00
        assert_eq!(transfer_fee, 1.00);
    }

    #[test]
    fn slippage_moves_price_adversely() {
        let sim = TradingSimulator::default();
        assert_eq!(sim.apply_slippage(10.0, Side::Buy), 10.01);
        assert_eq!(sim.apply_slippage(10.0, Side::Sell), 9.99);
    }

    #[test]
    fn execute_fills_at_slipped_close_and_sets_fees() {
        let sim = TradingSimulator::default();
        let cal = one_day_calendar();
        let bar = DailyBar::new(10.0, 10.2, 9.8, 10.0, 10.0, 1_000.0, 10_000.0);
        let mkt = market("000001.SZ", bar);

        let mut order = Order::new_pending(1, "000001.SZ", Side::Buy, 100, 10.0, d("2024-01-02"));
        let cash_delta = sim.execute(&mut order, &mkt, &cal).unwrap();

        assert!(order.is_terminal());
        assert_eq!(order.executed_qty, 100);
        assert_eq!(order.executed_price, 10.01);
        assert!(cash_delta < 0.0); // BUY: cash leaves
    }

    #[test]
    fn execute_rejects_and_leaves_order_terminal_with_reason() {
        let sim = TradingSimulator::default();
        let cal = one_day_calendar();
        let bar = DailyBar::new(11.0, 11.0, 11.0, 11.0, 10.0, 1_000.0, 11_000.0);
        let mkt = market("000001.SZ", bar);

        let mut order = Order::new_pending(1, "000001.SZ", Side::Buy, 100, 11.0, d("2024-01-02"));
        let err = sim.execute(&mut order, &mkt, &cal).unwrap_err();
        assert_eq!(err, RejectReason::LimitUp);
        assert_eq!(order.status, ashq_schemas::OrderStatus::Rejected);
        assert_eq!(order.reject_reason.as_deref(), Some("limit-up, cannot buy"));
    }
}
