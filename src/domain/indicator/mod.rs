//! Indicator engine.
//!
//! Every series is aligned 1:1 with the bar series and causal: the value at
//! index `i` depends only on bars `0..=i`. Undefined values (warm-up, zero
//! denominators) are `None` and never compare true downstream.
//!
//! - `sma`: rolling simple moving average
//! - `ema`: exponential smoothing without bias adjustment
//! - `momentum`: double-smoothed momentum oscillator (Q2)

pub mod ema;
pub mod momentum;
pub mod sma;

use crate::domain::bar::BarSeries;
use crate::domain::strategy::StrategyParams;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    /// SMA of the bar close.
    Sma(usize),
    /// SMA of the reference index close.
    IndexSma(usize),
    /// Double-smoothed momentum oscillator with the given span.
    Momentum(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "MA({})", period),
            IndicatorType::IndexSma(period) => write!(f, "INDEX_MA({})", period),
            IndicatorType::Momentum(span) => write!(f, "Q2({})", span),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied().flatten()
    }

    /// Value at `i` and at `i - 1`, when both are defined.
    pub fn with_prev(&self, i: usize) -> Option<(f64, f64)> {
        if i == 0 {
            return None;
        }
        Some((self.get(i)?, self.get(i - 1)?))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Indicator outputs for one bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    /// Short-term trend average of close (`ma7`).
    pub ma: IndicatorSeries,
    /// Trend average of the index close (`index_ma5`).
    pub index_ma: IndicatorSeries,
    /// Momentum oscillator (`q2`).
    pub q2: IndicatorSeries,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.ma.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ma.is_empty()
    }
}

pub fn compute_indicators(series: &BarSeries, params: &StrategyParams) -> IndicatorFrame {
    let closes = series.closes();
    let index_closes = series.index_closes();

    IndicatorFrame {
        ma: IndicatorSeries {
            indicator_type: IndicatorType::Sma(params.ma_period),
            values: sma::rolling_mean(&closes, params.ma_period, params.warmup),
        },
        index_ma: IndicatorSeries {
            indicator_type: IndicatorType::IndexSma(params.index_ma_period),
            values: sma::rolling_mean(&index_closes, params.index_ma_period, params.warmup),
        },
        q2: IndicatorSeries {
            indicator_type: IndicatorType::Momentum(params.momentum_span),
            values: momentum::momentum_oscillator(
                &closes,
                params.momentum_span,
                params.momentum_zero,
            ),
        },
    }
}
