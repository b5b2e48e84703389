//! Small shared statistics primitives. No external stats crate: every
//! formula here is a closed-form textbook definition, so a hand-rolled
//! population-variance helper is clearer than pulling in a dependency
//! for three one-line reductions.

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;
pub const RISK_FREE_RATE: f64 = 0.03;

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Population standard deviation (divides by N, not N-1), matching the
/// annualized-Sharpe convention in §4.4.
pub fn stdev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    variance.sqrt()
}

pub fn covariance(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.is_empty() {
        return 0.0;
    }
    let mx = mean(xs);
    let my = mean(ys);
    xs.iter().zip(ys).map(|(x, y)| (x - mx) * (y - my)).sum::<f64>() / xs.len() as f64
}

pub fn variance(xs: &[f64]) -> f64 {
    let s = stdev(xs);
    s * s
}

/// 5th-percentile by sorted-index selection, used for VaR₅/CVaR₅.
pub fn percentile_5(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((sorted.len() as f64) * 0.05) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_stdev_of_constant_series_is_zero_variance() {
        let xs = vec![1.0, 1.0, 1.0];
        assert_eq!(mean(&xs), 1.0);
        assert_eq!(stdev(&xs), 0.0);
    }

    #[test]
    fn stdev_matches_known_population_value() {
        let xs = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((stdev(&xs) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn percentile_5_picks_low_tail() {
        let xs: Vec<f64> = (1..=100).map(|i| i as f64).collect();
        let p5 = percentile_5(&xs);
        assert_eq!(p5, 6.0); // index 5 (0-based) of a 1..=100 sorted series
    }

    #[test]
    fn covariance_of_identical_series_equals_variance() {
        let xs = vec![1.0, 2.0, 3.0, 4.0];
        assert!((covariance(&xs, &xs) - variance(&xs)).abs() < 1e-12);
    }
}
