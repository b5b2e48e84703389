use ashq_schemas::PortfolioSnapshot;

use crate::report::{AdvancedMetrics, RelativeMetrics};
use crate::stats::{covariance, mean, percentile_5, stdev, variance, RISK_FREE_RATE, TRADING_DAYS_PER_YEAR};

/// Advanced risk/return metrics. When a benchmark's daily returns are
/// supplied and aligned 1:1 with `snapshots`, also computes
/// Beta/Alpha/Information-ratio via OLS against the benchmark's own
/// return series, rather than reporting fixed placeholder values.
pub fn compute_advanced_metrics(
    snapshots: &[PortfolioSnapshot],
    annual_return: f64,
    benchmark_daily_returns: Option<&[f64]>,
) -> AdvancedMetrics {
    if snapshots.is_empty() {
        return AdvancedMetrics {
            sortino: 0.0,
            var_5: 0.0,
            cvar_5: 0.0,
            max_consecutive_losing_days: 0,
            winning_days_ratio: 0.0,
            avg_win_loss_ratio: 0.0,
            relative: None,
        };
    }

    let daily_returns: Vec<f64> = snapshots.iter().map(|s| s.daily_return).collect();

    let sortino = compute_sortino(&daily_returns, annual_return);
    let var_5 = percentile_5(&daily_returns);
    let cvar_5 = {
        let tail: Vec<f64> = daily_returns.iter().copied().filter(|r| *r <= var_5).collect();
        mean(&tail)
    };

    let max_consecutive_losing_days = longest_negative_run(&daily_returns);

    let positive: Vec<f64> = daily_returns.iter().copied().filter(|r| *r > 0.0).collect();
    let negative: Vec<f64> = daily_returns.iter().copied().filter(|r| *r < 0.0).collect();

    let winning_days_ratio = positive.len() as f64 / daily_returns.len() as f64;

    let avg_win_loss_ratio = if negative.is_empty() || positive.is_empty() {
        0.0
    } else {
        mean(&positive) / mean(&negative).abs()
    };

    let relative = benchmark_daily_returns
        .filter(|b| b.len() == daily_returns.len() && !b.is_empty())
        .map(|b| ols_relative_metrics(&daily_returns, b));

    AdvancedMetrics {
        sortino,
        var_5,
        cvar_5,
        max_consecutive_losing_days,
        winning_days_ratio,
        avg_win_loss_ratio,
        relative,
    }
}

/// `annual_return` is the same compounded annualized return fed into
/// Sharpe (`BasicMetrics::annual_return`), not the arithmetic mean of
/// daily returns annualized — matching the original's reuse of
/// `calculate_basic_metrics()['annual_return']` in its Sortino formula.
fn compute_sortino(daily_returns: &[f64], annual_return: f64) -> f64 {
    let negative: Vec<f64> = daily_returns.iter().copied().filter(|r| *r < 0.0).collect();
    if negative.is_empty() {
        return 0.0;
    }
    let downside_deviation = stdev(&negative) * TRADING_DAYS_PER_YEAR.sqrt();
    if downside_deviation == 0.0 {
        return 0.0;
    }
    (annual_return - RISK_FREE_RATE) / downside_deviation
}

fn longest_negative_run(daily_returns: &[f64]) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for r in daily_returns {
        if *r < 0.0 {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// `beta = cov(port, bench) / var(bench)`;
/// `alpha = mean(port) - beta*mean(bench)`, annualized by `*252`;
/// `info_ratio = mean(port - bench) / stdev(port - bench) * sqrt(252)`.
fn ols_relative_metrics(portfolio_returns: &[f64], benchmark_returns: &[f64]) -> RelativeMetrics {
    let bench_var = variance(benchmark_returns);
    let beta = if bench_var > 0.0 {
        covariance(portfolio_returns, benchmark_returns) / bench_var
    } else {
        0.0
    };

    let alpha = (mean(portfolio_returns) - beta * mean(benchmark_returns)) * TRADING_DAYS_PER_YEAR;

    let active_returns: Vec<f64> = portfolio_returns
        .iter()
        .zip(benchmark_returns)
        .map(|(p, b)| p - b)
        .collect();
    let tracking_error = stdev(&active_returns);
    let info_ratio = if tracking_error > 0.0 {
        mean(&active_returns) / tracking_error * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    RelativeMetrics {
        beta,
        alpha,
        info_ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn snap(daily_return: f64, drawdown: f64) -> PortfolioSnapshot {
        PortfolioSnapshot {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            total_value: 0.0,
            cash: 0.0,
            positions_value: 0.0,
            position_count: 0,
            daily_return,
            cumulative_return: 0.0,
            drawdown,
            positions: BTreeMap::new(),
        }
    }

    #[test]
    fn no_negative_returns_gives_zero_sortino() {
        let snaps = vec![snap(0.01, 0.0), snap(0.02, 0.0)];
        let m = compute_advanced_metrics(&snaps, 0.1, None);
        assert_eq!(m.sortino, 0.0);
    }

    #[test]
    fn max_consecutive_losing_days_counts_longest_run() {
        let snaps = vec![
            snap(0.01, 0.0),
            snap(-0.01, -0.01),
            snap(-0.02, -0.02),
            snap(-0.01, -0.03),
            snap(0.02, 0.0),
            snap(-0.005, -0.005),
        ];
        let m = compute_advanced_metrics(&snaps, 0.1, None);
        assert_eq!(m.max_consecutive_losing_days, 3);
    }

    #[test]
    fn winning_days_ratio_is_fraction_positive() {
        let snaps = vec![snap(0.01, 0.0), snap(-0.01, -0.01), snap(0.02, 0.0), snap(0.0, 0.0)];
        let m = compute_advanced_metrics(&snaps, 0.1, None);
        assert_eq!(m.winning_days_ratio, 0.5);
    }

    #[test]
    fn perfectly_tracking_benchmark_gives_beta_one_and_zero_alpha() {
        let returns = vec![0.01, -0.02, 0.015, 0.0, -0.01];
        let snaps: Vec<_> = returns.iter().map(|r| snap(*r, 0.0)).collect();
        let m = compute_advanced_metrics(&snaps, 0.1, Some(&returns));
        let rel = m.relative.expect("benchmark aligned");
        assert!((rel.beta - 1.0).abs() < 1e-9);
        assert!(rel.alpha.abs() < 1e-9);
        assert_eq!(rel.info_ratio, 0.0);
    }

    #[test]
    fn mismatched_benchmark_length_is_ignored() {
        let snaps = vec![snap(0.01, 0.0), snap(-0.02, 0.0)];
        let bench = vec![0.01];
        let m = compute_advanced_metrics(&snaps, 0.1, Some(&bench));
        assert!(m.relative.is_none());
    }
}
