//! Backtest engine: a single-position fold over the bar series.
//!
//! Each bar runs, in order: exit check, entry check, equity recording.
//! `step` is the fold body; `run_backtest` drives it over the series.

use chrono::NaiveDate;
use tracing::debug;

use super::account::{Account, EquityPoint};
use super::bar::{Bar, BarSeries};
use super::indicator::{IndicatorFrame, compute_indicators};
use super::position::{ClosedTrade, Position};
use super::signal::{SignalBreakdown, signal_breakdowns};
use super::strategy::StrategyParams;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Opaque instrument identifier, not interpreted by the engine.
    pub symbol: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_cash: f64,
}

/// What one bar produced.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub equity: EquityPoint,
    pub trade: Option<ClosedTrade>,
    pub entered: bool,
}

pub fn step(
    mut account: Account,
    bar: &Bar,
    ma: Option<f64>,
    signal: bool,
    params: &StrategyParams,
) -> (Account, StepOutcome) {
    let mut trade = None;

    if let Some(reason) = account
        .position
        .as_ref()
        .and_then(|pos| pos.exit_reason(bar.close, ma))
    {
        if let Some(pos) = account.position.take() {
            account.cash = pos.market_value(bar.close);
            let closed = pos.close(bar.date, bar.close, reason);
            debug!(
                date = %bar.date,
                price = bar.close,
                return_pct = closed.return_pct,
                %reason,
                "exit"
            );
            trade = Some(closed);
        }
    }

    let reentry_blocked = trade.is_some() && !params.same_bar_reentry;
    let can_buy = bar.close.is_finite() && bar.close > 0.0 && account.cash > 0.0;
    let mut entered = false;

    if account.is_flat() && signal && can_buy && !reentry_blocked {
        let shares = account.cash / bar.close;
        account.cash = 0.0;
        account.position = Some(Position {
            shares,
            entry_price: bar.close,
            entry_date: bar.date,
            stop_price: bar.low,
        });
        entered = true;
        debug!(date = %bar.date, price = bar.close, stop = bar.low, shares, "entry");
    }

    let equity = EquityPoint {
        date: bar.date,
        equity: account.equity(bar.close),
    };

    (
        account,
        StepOutcome {
            equity,
            trade,
            entered,
        },
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub initial_cash: f64,
    pub equity_curve: Vec<EquityPoint>,
    pub trades: Vec<ClosedTrade>,
    /// State after the last bar; an open position stays open.
    pub final_account: Account,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_cash)
    }

    pub fn open_position(&self) -> Option<&Position> {
        self.final_account.position.as_ref()
    }
}

pub fn run_backtest(
    series: &BarSeries,
    frame: &IndicatorFrame,
    signals: &[bool],
    config: &BacktestConfig,
    params: &StrategyParams,
) -> BacktestResult {
    let mut account = Account::new(config.initial_cash);
    let mut equity_curve = Vec::with_capacity(series.len());
    let mut trades = Vec::new();

    for (i, bar) in series.bars().iter().enumerate() {
        let signal = signals.get(i).copied().unwrap_or(false);
        let (next, outcome) = step(account, bar, frame.ma.get(i), signal, params);
        account = next;
        equity_curve.push(outcome.equity);
        if let Some(trade) = outcome.trade {
            trades.push(trade);
        }
    }

    BacktestResult {
        initial_cash: config.initial_cash,
        equity_curve,
        trades,
        final_account: account,
    }
}

/// Everything one strategy run produced, for reporting.
#[derive(Debug, Clone)]
pub struct BacktestReport {
    pub config: BacktestConfig,
    pub params: StrategyParams,
    pub series: BarSeries,
    pub frame: IndicatorFrame,
    pub breakdowns: Vec<SignalBreakdown>,
    pub signals: Vec<bool>,
    pub result: BacktestResult,
}

impl BacktestReport {
    pub fn signal_count(&self) -> usize {
        self.signals.iter().filter(|&&s| s).count()
    }
}

/// Indicators, signals and simulation for one series.
pub fn run_strategy(
    series: BarSeries,
    config: &BacktestConfig,
    params: &StrategyParams,
) -> BacktestReport {
    let frame = compute_indicators(&series, params);
    let breakdowns = signal_breakdowns(&series, &frame, params);
    let signals: Vec<bool> = breakdowns.iter().map(SignalBreakdown::all).collect();
    let result = run_backtest(&series, &frame, &signals, config, params);

    BacktestReport {
        config: config.clone(),
        params: params.clone(),
        series,
        frame,
        breakdowns,
        signals,
        result,
    }
}
