//! Exponential smoothing over a possibly sparse series.
//!
//! alpha = 2/(span+1), no bias adjustment:
//! E[first] = V[first], E[i] = alpha * V[i] + (1 - alpha) * E[i-1].
//! Leading undefined inputs stay undefined; an undefined input after the
//! seed carries the previous smoothed value forward.

pub fn smoothing_factor(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

pub fn ewm(values: &[Option<f64>], span: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if span == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let alpha = smoothing_factor(span);
    let mut prev: Option<f64> = None;

    for v in values {
        let next = match (prev, v.filter(|x| x.is_finite())) {
            (None, None) => None,
            (None, Some(x)) => Some(x),
            (Some(p), None) => Some(p),
            (Some(p), Some(x)) => Some(alpha * x + (1.0 - alpha) * p),
        };
        out.push(next);
        prev = next;
    }

    out
}
