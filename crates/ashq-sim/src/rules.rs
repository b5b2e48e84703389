/// Fee/limit/slippage table. All fields tunable; defaults are the
/// bit-exact A-share market constants.
#[derive(Debug, Clone, PartialEq)]
pub struct TradingRule {
    /// Regular daily price-move limit, e.g. 0.10 for ±10%.
    pub limit_pct: f64,
    /// ST-issuer daily price-move limit, e.g. 0.05 for ±5%.
    pub st_limit_pct: f64,
    /// Minimum and step size for BUY quantities.
    pub buy_unit: i64,
    pub commission_rate: f64,
    pub min_commission: f64,
    /// Stamp tax rate, charged on SELL only.
    pub stamp_tax_rate: f64,
    /// Transfer fee rate, charged only on `.SH` symbols.
    pub transfer_fee_rate: f64,
    pub transfer_fee_floor: f64,
    /// Adverse slippage rate applied to the fill price.
    pub slippage_rate: f64,
    /// Tolerance band around the limit price used to decide whether a
    /// close price counts as at limit-up/limit-down, absorbing
    /// floating-point rounding noise.
    pub limit_epsilon: f64,
}

impl Default for TradingRule {
    fn default() -> Self {
        Self {
            limit_pct: 0.10,
            st_limit_pct: 0.05,
            buy_unit: 100,
            commission_rate: 0.0001,
            min_commission: 5.00,
            stamp_tax_rate: 0.001,
            transfer_fee_rate: 0.00002,
            transfer_fee_floor: 1.00,
            slippage_rate: 0.001,
            limit_epsilon: 0.001,
        }
    }
}
