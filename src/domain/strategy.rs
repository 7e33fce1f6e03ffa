//! Strategy parameters for the breakout strategy.
//!
//! The defaults reproduce the stock rules: MA(7) trend, MA(5) index regime,
//! span-6 double-smoothed momentum, a >9.5% day within 30 bars, momentum
//! floor of -20 and at most 3% extension above MA(7).

use std::fmt;
use std::str::FromStr;

/// How rolling averages treat bars before the window is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WarmupPolicy {
    /// Undefined until `period` bars are available.
    #[default]
    Strict,
    /// Average whatever bars are available from the first bar onward.
    Partial,
}

/// What the momentum oscillator yields when its denominator is ~0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroDenominatorPolicy {
    /// The oscillator is undefined for that bar.
    #[default]
    Undefined,
    /// A tiny epsilon is added to the denominator.
    Epsilon,
}

impl FromStr for WarmupPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(WarmupPolicy::Strict),
            "partial" => Ok(WarmupPolicy::Partial),
            other => Err(format!("unknown warmup policy '{other}' (expected strict or partial)")),
        }
    }
}

impl FromStr for ZeroDenominatorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "undefined" => Ok(ZeroDenominatorPolicy::Undefined),
            "epsilon" => Ok(ZeroDenominatorPolicy::Epsilon),
            other => Err(format!(
                "unknown momentum_zero policy '{other}' (expected undefined or epsilon)"
            )),
        }
    }
}

impl fmt::Display for WarmupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarmupPolicy::Strict => write!(f, "strict"),
            WarmupPolicy::Partial => write!(f, "partial"),
        }
    }
}

impl fmt::Display for ZeroDenominatorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroDenominatorPolicy::Undefined => write!(f, "undefined"),
            ZeroDenominatorPolicy::Epsilon => write!(f, "epsilon"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub ma_period: usize,
    pub index_ma_period: usize,
    pub momentum_span: usize,
    pub limit_up_pct: f64,
    pub limit_up_lookback: usize,
    pub momentum_floor: f64,
    pub max_extension_pct: f64,
    pub warmup: WarmupPolicy,
    pub momentum_zero: ZeroDenominatorPolicy,
    pub same_bar_reentry: bool,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            ma_period: 7,
            index_ma_period: 5,
            momentum_span: 6,
            limit_up_pct: 9.5,
            limit_up_lookback: 30,
            momentum_floor: -20.0,
            max_extension_pct: 3.0,
            warmup: WarmupPolicy::Strict,
            momentum_zero: ZeroDenominatorPolicy::Undefined,
            same_bar_reentry: true,
        }
    }
}

impl StrategyParams {
    /// Longest window any condition reads. Shorter series never signal.
    pub fn min_bars(&self) -> usize {
        self.limit_up_lookback
            .max(self.ma_period + 1)
            .max(self.index_ma_period)
    }
}
