use ashq_schemas::Symbol;

/// Why `PortfolioManager::risk_check` wants a position (or the whole
/// portfolio) force-sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskReason {
    StopLoss,
    TakeProfit,
    Concentration,
    MaxDrawdown,
}

impl std::fmt::Display for RiskReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskReason::StopLoss => "stop_loss",
            RiskReason::TakeProfit => "take_profit",
            RiskReason::Concentration => "concentration",
            RiskReason::MaxDrawdown => "max_drawdown",
        };
        write!(f, "{s}")
    }
}

/// One emitted risk event. `symbol = None` marks the portfolio-level
/// drawdown check rather than a single position's.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskViolation {
    pub symbol: Option<Symbol>,
    pub reason: RiskReason,
}
