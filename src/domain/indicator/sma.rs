//! Simple Moving Average.
//!
//! SMA(n)[i] = sum(V[i-n+1..=i]) / n, maintained as a sliding sum.
//! Strict warmup: first (n-1) values are undefined.
//! Partial warmup: values before the window fills average the bars seen so far.

use crate::domain::strategy::WarmupPolicy;

pub fn rolling_mean(values: &[f64], period: usize, warmup: WarmupPolicy) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= period {
            sum -= values[i - period];
        }

        let count = (i + 1).min(period);
        out[i] = if count == period || warmup == WarmupPolicy::Partial {
            Some(sum / count as f64)
        } else {
            None
        };
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sma_basic() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
        let sma = rolling_mean(&values, 3, WarmupPolicy::Strict);

        assert_eq!(sma.len(), values.len());
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());
        assert_eq!(sma[2], Some(2.0));
        assert_eq!(sma[3], Some(3.0));
        assert_eq!(sma[9], Some(9.0));
    }

    #[test]
    fn sma_period_larger_than_data() {
        let sma = rolling_mean(&[1.0, 2.0, 3.0], 5, WarmupPolicy::Strict);
        assert!(sma.iter().all(|v| v.is_none()));
    }

    #[test]
    fn sma_partial_window() {
        let sma = rolling_mean(&[2.0, 4.0, 6.0, 8.0], 3, WarmupPolicy::Partial);
        assert_eq!(sma, vec![Some(2.0), Some(3.0), Some(4.0), Some(6.0)]);
    }

    #[test]
    fn sma_period_zero_is_undefined() {
        let sma = rolling_mean(&[1.0, 2.0], 0, WarmupPolicy::Partial);
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn sma_seven_matches_direct_mean() {
        let values: Vec<f64> = (0..20).map(|i| 10.0 + (i as f64 * 0.37).sin()).collect();
        let sma = rolling_mean(&values, 7, WarmupPolicy::Strict);
        for i in 6..values.len() {
            let direct = values[i - 6..=i].iter().sum::<f64>() / 7.0;
            assert_relative_eq!(sma[i].unwrap(), direct, epsilon = 1e-9);
        }
    }

    #[test]
    fn sma_empty() {
        assert!(rolling_mean(&[], 7, WarmupPolicy::Strict).is_empty());
    }
}
