//! Double-smoothed momentum oscillator (Q2).
//!
//! d[i] = C[i] - C[i-1] (undefined at the first bar)
//! s2 = EWM(EWM(d)), a2 = EWM(EWM(|d|)), Q2 = 100 * s2 / a2.
//! Bounded to [-100, 100]; sign gives the direction of recent moves.

use crate::domain::indicator::ema::ewm;
use crate::domain::strategy::ZeroDenominatorPolicy;

/// Denominators at or below this are treated as zero.
pub const ZERO_THRESHOLD: f64 = 1e-12;

/// Added to the denominator under `ZeroDenominatorPolicy::Epsilon`.
pub const DENOMINATOR_EPSILON: f64 = 1e-9;

pub fn price_changes(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        if i == 0 {
            out.push(None);
        } else {
            out.push(Some(closes[i] - closes[i - 1]));
        }
    }
    out
}

pub fn momentum_oscillator(
    closes: &[f64],
    span: usize,
    policy: ZeroDenominatorPolicy,
) -> Vec<Option<f64>> {
    let d = price_changes(closes);
    let abs_d: Vec<Option<f64>> = d.iter().map(|v| v.map(f64::abs)).collect();

    let s2 = ewm(&ewm(&d, span), span);
    let a2 = ewm(&ewm(&abs_d, span), span);

    s2.iter()
        .zip(a2.iter())
        .map(|(s, a)| {
            let (s, a) = ((*s)?, (*a)?);
            match policy {
                ZeroDenominatorPolicy::Undefined if a <= ZERO_THRESHOLD => None,
                ZeroDenominatorPolicy::Undefined => Some(100.0 * s / a),
                ZeroDenominatorPolicy::Epsilon => Some(100.0 * s / (a + DENOMINATOR_EPSILON)),
            }
        })
        .collect()
}
