use ashq_schemas::PortfolioSnapshot;

use crate::report::BasicMetrics;
use crate::stats::{mean, stdev, RISK_FREE_RATE, TRADING_DAYS_PER_YEAR};

/// Basic return/risk metrics derived from the daily snapshot history.
pub fn compute_basic_metrics(snapshots: &[PortfolioSnapshot]) -> BasicMetrics {
    if snapshots.is_empty() {
        return BasicMetrics {
            total_return: 0.0,
            trading_years: 0.0,
            annual_return: 0.0,
            volatility: 0.0,
            sharpe: 0.0,
            max_drawdown: 0.0,
            calmar: 0.0,
        };
    }

    let total_return = snapshots.last().expect("non-empty").cumulative_return;
    let trading_years = snapshots.len() as f64 / TRADING_DAYS_PER_YEAR;

    let annual_return = if trading_years > 0.0 {
        (1.0 + total_return).powf(1.0 / trading_years) - 1.0
    } else {
        0.0
    };

    let daily_returns: Vec<f64> = snapshots.iter().map(|s| s.daily_return).collect();
    let volatility = stdev(&daily_returns) * TRADING_DAYS_PER_YEAR.sqrt();

    let sharpe = if volatility > 0.0 {
        (annual_return - RISK_FREE_RATE) / volatility
    } else {
        0.0
    };

    let max_drawdown = snapshots
        .iter()
        .map(|s| s.drawdown)
        .fold(0.0_f64, f64::min);

    let calmar = if max_drawdown != 0.0 {
        annual_return / max_drawdown.abs()
    } else {
        0.0
    };

    BasicMetrics {
        total_return,
        trading_years,
        annual_return,
        volatility,
        sharpe,
        max_drawdown,
        calmar,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn snap(date: &str, total_value: f64, cumulative_return: f64, daily_return: f64, drawdown: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            total_value,
            cash: total_value,
            positions_value: 0.0,
            position_count: 0,
            daily_return,
            cumulative_return,
            drawdown,
            positions: BTreeMap::new(),
        }
    }

    #[test]
    fn empty_snapshots_yields_zeroed_report() {
        let m = compute_basic_metrics(&[]);
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.sharpe, 0.0);
    }

    #[test]
    fn one_day_window_has_zero_trading_years_fraction_but_no_panic() {
        let snaps = vec![snap("2024-01-02", 1_000_000.0, 0.0, 0.0, 0.0)];
        let m = compute_basic_metrics(&snaps);
        assert!(m.trading_years > 0.0);
        assert_eq!(m.total_return, 0.0);
    }

    #[test]
    fn positive_trend_gives_positive_sharpe() {
        let snaps = vec![
            snap("2024-01-02", 1_000_000.0, 0.0, 0.0, 0.0),
            snap("2024-01-03", 1_010_000.0, 0.01, 0.01, 0.0),
            snap("2024-01-04", 1_020_100.0, 0.0201, 0.01, 0.0),
        ];
        let m = compute_basic_metrics(&snaps);
        assert!(m.sharpe > 0.0);
        assert!(m.max_drawdown <= 0.0);
    }

    #[test]
    fn zero_volatility_gives_zero_sharpe_not_nan() {
        let snaps = vec![
            snap("2024-01-02", 1_000_000.0, 0.0, 0.0, 0.0),
            snap("2024-01-03", 1_000_000.0, 0.0, 0.0, 0.0),
        ];
        let m = compute_basic_metrics(&snaps);
        assert_eq!(m.sharpe, 0.0);
        assert!(!m.sharpe.is_nan());
    }

    #[test]
    fn mean_helper_used_directly_for_sanity() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
    }
}
