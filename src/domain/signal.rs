//! Entry signal evaluation.
//!
//! A bar is entry-eligible when all seven conditions hold. Each condition
//! reads only the current and earlier bars; any undefined input makes the
//! condition false.

use crate::domain::bar::BarSeries;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::strategy::{StrategyParams, WarmupPolicy};

/// Per-condition result for one bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SignalBreakdown {
    /// Index close above its own trend average.
    pub index_regime: bool,
    /// A near-limit-up day inside the lookback window.
    pub recent_limit_up: bool,
    /// Momentum higher than on the prior bar.
    pub momentum_rising: bool,
    /// Momentum above the floor.
    pub momentum_above_floor: bool,
    /// Trend average higher than on the prior bar.
    pub trend_rising: bool,
    /// Close above the prior bar's high.
    pub breakout: bool,
    /// Close no more than the allowed percentage above the trend average.
    pub not_extended: bool,
}

impl SignalBreakdown {
    pub fn all(&self) -> bool {
        self.index_regime
            && self.recent_limit_up
            && self.momentum_rising
            && self.momentum_above_floor
            && self.trend_rising
            && self.breakout
            && self.not_extended
    }

    pub fn passed(&self) -> usize {
        [
            self.index_regime,
            self.recent_limit_up,
            self.momentum_rising,
            self.momentum_above_floor,
            self.trend_rising,
            self.breakout,
            self.not_extended,
        ]
        .iter()
        .filter(|&&c| c)
        .count()
    }
}

pub fn evaluate_bar(
    series: &BarSeries,
    frame: &IndicatorFrame,
    params: &StrategyParams,
    i: usize,
) -> SignalBreakdown {
    let bars = series.bars();
    if i >= bars.len() || frame.len() != bars.len() {
        return SignalBreakdown::default();
    }
    let bar = &bars[i];
    let index_close = bar.index_close.unwrap_or(bar.close);

    let index_regime = frame
        .index_ma
        .get(i)
        .is_some_and(|ma| index_close > ma);

    let recent_limit_up = window_max_pct(series, i, params.limit_up_lookback, params.warmup)
        .is_some_and(|max| max > params.limit_up_pct);

    let momentum_rising = frame
        .q2
        .with_prev(i)
        .is_some_and(|(q2, prev)| q2 > prev);

    let momentum_above_floor = frame
        .q2
        .get(i)
        .is_some_and(|q2| q2 > params.momentum_floor);

    let trend_rising = frame
        .ma
        .with_prev(i)
        .is_some_and(|(ma, prev)| ma > prev);

    let breakout = i > 0 && bar.close > bars[i - 1].high;

    let not_extended = frame
        .ma
        .get(i)
        .filter(|ma| *ma != 0.0)
        .map(|ma| (bar.close - ma) / ma * 100.0)
        .is_some_and(|ext| ext.is_finite() && ext <= params.max_extension_pct);

    SignalBreakdown {
        index_regime,
        recent_limit_up,
        momentum_rising,
        momentum_above_floor,
        trend_rising,
        breakout,
        not_extended,
    }
}

/// Largest `pct_chg` over the `lookback` bars ending at `i`, inclusive.
///
/// Strict: undefined when the window is incomplete or holds an undefined
/// change. Partial: the max of whatever defined changes the truncated
/// window holds.
fn window_max_pct(
    series: &BarSeries,
    i: usize,
    lookback: usize,
    warmup: WarmupPolicy,
) -> Option<f64> {
    if lookback == 0 || i >= series.len() {
        return None;
    }
    match warmup {
        WarmupPolicy::Strict => {
            if i + 1 < lookback {
                return None;
            }
            series.bars()[i + 1 - lookback..=i]
                .iter()
                .map(|b| b.pct_chg)
                .try_fold(f64::NEG_INFINITY, |acc, v| v.map(|v| acc.max(v)))
        }
        WarmupPolicy::Partial => series.bars()[(i + 1).saturating_sub(lookback)..=i]
            .iter()
            .filter_map(|b| b.pct_chg)
            .reduce(f64::max),
    }
}

pub fn signal_breakdowns(
    series: &BarSeries,
    frame: &IndicatorFrame,
    params: &StrategyParams,
) -> Vec<SignalBreakdown> {
    if series.len() < params.min_bars() {
        return vec![SignalBreakdown::default(); series.len()];
    }
    (0..series.len())
        .map(|i| evaluate_bar(series, frame, params, i))
        .collect()
}

pub fn evaluate_signals(
    series: &BarSeries,
    frame: &IndicatorFrame,
    params: &StrategyParams,
) -> Vec<bool> {
    signal_breakdowns(series, frame, params)
        .iter()
        .map(SignalBreakdown::all)
        .collect()
}
