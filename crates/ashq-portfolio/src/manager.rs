use std::collections::BTreeMap;

use ashq_schemas::{MarketDay, PortfolioSnapshot, Position, Side, Symbol, Trade};
use chrono::NaiveDate;

use crate::config::PortfolioConfig;
use crate::risk::{RiskReason, RiskViolation};
use crate::summary::PortfolioSummary;

/// Estimated commission rate used only for position-sizing headroom
/// in `size_position`; the real commission is computed later by
/// `ashq-sim` once the order actually fills.
const SIZE_ESTIMATE_COMMISSION_RATE: f64 = 0.0003;

/// Owns cash, positions, and the snapshot history; evaluates
/// position-level and portfolio-level risk limits; sizes candidate
/// positions.
#[derive(Debug, Clone)]
pub struct PortfolioManager {
    initial_cash: f64,
    cash: f64,
    positions: BTreeMap<Symbol, Position>,
    snapshots: Vec<PortfolioSnapshot>,
    running_peak_value: f64,
    max_drawdown: f64,
    total_trades: u64,
    winning_trades: u64,
    losing_trades: u64,
    config: PortfolioConfig,
    /// Trading days seen so far, in the order the engine fed them in;
    /// used to count *trading* days (not calendar days) elapsed since a
    /// position's entry date for the min-holding-days check.
    trading_days_seen: Vec<NaiveDate>,
}

impl PortfolioManager {
    pub fn new(initial_cash: f64, config: PortfolioConfig) -> Self {
        Self {
            initial_cash,
            cash: initial_cash,
            positions: BTreeMap::new(),
            snapshots: Vec::new(),
            running_peak_value: initial_cash,
            max_drawdown: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            config,
            trading_days_seen: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn positions(&self) -> &BTreeMap<Symbol, Position> {
        &self.positions
    }

    pub fn snapshots(&self) -> &[PortfolioSnapshot] {
        &self.snapshots
    }

    pub fn positions_value(&self) -> f64 {
        self.positions.values().map(|p| p.market_value).sum()
    }

    pub fn total_value(&self) -> f64 {
        self.cash + self.positions_value()
    }

    // -----------------------------------------------------------------
    // Trade application
    // -----------------------------------------------------------------

    pub fn apply_trade(&mut self, trade: &Trade) {
        self.cash += trade.net_cash_delta;
        self.total_trades += 1;

        match trade.side {
            Side::Buy => self.apply_buy(trade),
            Side::Sell => self.apply_sell(trade),
        }
    }

    fn apply_buy(&mut self, trade: &Trade) {
        match self.positions.get_mut(&trade.symbol) {
            Some(pos) => {
                let new_qty = pos.qty + trade.qty;
                pos.avg_cost =
                    (pos.avg_cost * pos.qty as f64 + trade.price * trade.qty as f64) / new_qty as f64;
                pos.qty = new_qty;
            }
            None => {
                self.positions.insert(
                    trade.symbol.clone(),
                    Position::new(trade.symbol.clone(), trade.qty, trade.price, trade.trade_date),
                );
            }
        }
    }

    fn apply_sell(&mut self, trade: &Trade) {
        let Some(pos) = self.positions.get_mut(&trade.symbol) else {
            return;
        };

        let realized_pnl = (trade.price - pos.avg_cost) * trade.qty as f64;
        if realized_pnl >= 0.0 {
            self.winning_trades += 1;
        } else {
            self.losing_trades += 1;
        }

        if trade.qty >= pos.qty {
            self.positions.remove(&trade.symbol);
        } else {
            pos.qty -= trade.qty;
            // avg_cost unchanged on a partial sell.
        }
    }

    // -----------------------------------------------------------------
    // Mark-to-market
    // -----------------------------------------------------------------

    pub fn mark_to_market(&mut self, market_day: &MarketDay, date: NaiveDate) {
        for (symbol, pos) in self.positions.iter_mut() {
            if let Some(bar) = market_day.get(symbol) {
                pos.mark(bar.close, date);
            }
        }
    }

    // -----------------------------------------------------------------
    // Risk checks
    // -----------------------------------------------------------------

    fn observe_trading_day(&mut self, date: NaiveDate) {
        if self.trading_days_seen.last() != Some(&date) {
            self.trading_days_seen.push(date);
        }
    }

    fn trading_days_elapsed(&self, entry_date: NaiveDate, current_date: NaiveDate) -> u32 {
        let entry_idx = self.trading_days_seen.iter().position(|d| *d == entry_date);
        let current_idx = self.trading_days_seen.iter().position(|d| *d == current_date);
        match (entry_idx, current_idx) {
            (Some(e), Some(c)) if c >= e => (c - e) as u32,
            _ => u32::MAX, // unknown entry day: never block a forced sell
        }
    }

    /// Evaluate stop-loss / take-profit / concentration / drawdown
    /// limits. At most one reason is emitted per symbol per day, with
    /// stop-loss taking precedence over take-profit, which takes
    /// precedence over concentration.
    pub fn risk_check(&mut self, date: NaiveDate) -> Vec<RiskViolation> {
        self.observe_trading_day(date);

        let total_value = self.total_value();
        let mut violations = Vec::new();

        let symbols: Vec<Symbol> = self.positions.keys().cloned().collect();
        for symbol in symbols {
            let pos = &self.positions[&symbol];
            let elapsed = self.trading_days_elapsed(pos.entry_date, date);

            let emergency_stop = pos.unrealized_pnl_pct <= -1.5 * self.config.stop_loss_pct;
            let holding_exempt =
                self.config.min_holding_trading_days > 0 && elapsed < self.config.min_holding_trading_days;

            if holding_exempt && !emergency_stop {
                continue;
            }

            if pos.unrealized_pnl_pct <= -self.config.stop_loss_pct {
                violations.push(RiskViolation {
                    symbol: Some(symbol),
                    reason: RiskReason::StopLoss,
                });
                continue;
            }

            if pos.unrealized_pnl_pct >= self.config.take_profit_pct {
                violations.push(RiskViolation {
                    symbol: Some(symbol),
                    reason: RiskReason::TakeProfit,
                });
                continue;
            }

            if total_value > 0.0 && pos.market_value / total_value > self.config.max_single_position_pct {
                violations.push(RiskViolation {
                    symbol: Some(symbol),
                    reason: RiskReason::Concentration,
                });
            }
        }

        if total_value > self.running_peak_value {
            self.running_peak_value = total_value;
        }
        let drawdown = if self.running_peak_value > 0.0 {
            (total_value - self.running_peak_value) / self.running_peak_value
        } else {
            0.0
        };
        if drawdown < self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        if drawdown.abs() > self.config.max_drawdown_limit {
            violations.push(RiskViolation {
                symbol: None,
                reason: RiskReason::MaxDrawdown,
            });
        }

        violations
    }

    // -----------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------

    pub fn snapshot(&mut self, date: NaiveDate) -> &PortfolioSnapshot {
        let total_value = self.total_value();
        let cash = self.cash;
        let positions_value = self.positions_value();

        if total_value > self.running_peak_value {
            self.running_peak_value = total_value;
        }
        let drawdown = if self.running_peak_value > 0.0 {
            (total_value - self.running_peak_value) / self.running_peak_value
        } else {
            0.0
        };
        if drawdown < self.max_drawdown {
            self.max_drawdown = drawdown;
        }

        let prev_total_value = self.snapshots.last().map(|s| s.total_value);
        let daily_return = match prev_total_value {
            Some(prev) if prev != 0.0 => (total_value - prev) / prev,
            _ => 0.0,
        };
        let cumulative_return = if self.initial_cash != 0.0 {
            (total_value - self.initial_cash) / self.initial_cash
        } else {
            0.0
        };

        let snapshot = PortfolioSnapshot {
            date,
            total_value,
            cash,
            positions_value,
            position_count: self.positions.len(),
            daily_return,
            cumulative_return,
            drawdown,
            positions: self.positions.clone(),
        };
        self.snapshots.push(snapshot);
        self.snapshots.last().expect("just pushed")
    }

    // -----------------------------------------------------------------
    // Position sizing
    // -----------------------------------------------------------------

    /// `target_value = total_value * target_weight`, minus an estimated
    /// commission headroom, rounded down to a multiple of the buy unit
    /// (100 shares). Returns 0 if the result would be non-positive.
    pub fn size_position(&self, target_weight: f64, price: f64) -> i64 {
        if price <= 0.0 {
            return 0;
        }
        let target_value = self.total_value() * target_weight;
        let estimated_commission = target_value * SIZE_ESTIMATE_COMMISSION_RATE;
        let adjusted = target_value - estimated_commission;
        if adjusted <= 0.0 {
            return 0;
        }
        let raw_qty = (adjusted / price / 100.0).floor() * 100.0;
        raw_qty.max(0.0) as i64
    }

    pub fn can_open_new(&self) -> bool {
        self.positions.len() < self.config.max_total_positions
            && self.cash * (1.0 - self.config.cash_buffer_pct) >= self.config.min_position_value
    }

    // -----------------------------------------------------------------
    // Reporting / lifecycle
    // -----------------------------------------------------------------

    pub fn get_portfolio_summary(&self) -> PortfolioSummary {
        PortfolioSummary {
            cash: self.cash,
            positions_value: self.positions_value(),
            total_value: self.total_value(),
            position_count: self.positions.len(),
            total_trades: self.total_trades,
            winning_trades: self.winning_trades,
            losing_trades: self.losing_trades,
            max_drawdown: self.max_drawdown,
            positions: self.positions.clone(),
        }
    }

    pub fn reset(&mut self) {
        let initial_cash = self.initial_cash;
        let config = self.config.clone();
        *self = Self::new(initial_cash, config);
    }
}
