//! Summary metrics over a backtest result.

use super::account::EquityPoint;
use super::backtest::BacktestResult;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    /// (final - initial) / initial * 100
    pub total_return_pct: f64,
    /// Bars on which the entry signal fired.
    pub signal_count: usize,
    pub total_trades: usize,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
    pub avg_return_pct: f64,
    pub best_return_pct: f64,
    pub worst_return_pct: f64,
    /// Largest peak-to-trough decline of the equity curve, in percent.
    pub max_drawdown_pct: f64,
    pub avg_holding_days: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, signals: &[bool]) -> Self {
        let initial_cash = result.initial_cash;
        let final_equity = result.final_equity();

        let total_return_pct = if initial_cash > 0.0 {
            (final_equity - initial_cash) / initial_cash * 100.0
        } else {
            0.0
        };

        let signal_count = signals.iter().filter(|&&s| s).count();

        let trades = &result.trades;
        let total_trades = trades.len();
        let trades_won = trades.iter().filter(|t| t.return_pct > 0.0).count();
        let trades_lost = trades.iter().filter(|t| t.return_pct < 0.0).count();

        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        let (avg_return_pct, best_return_pct, worst_return_pct, avg_holding_days) =
            if total_trades > 0 {
                let n = total_trades as f64;
                let sum: f64 = trades.iter().map(|t| t.return_pct).sum();
                let best = trades
                    .iter()
                    .map(|t| t.return_pct)
                    .fold(f64::NEG_INFINITY, f64::max);
                let worst = trades
                    .iter()
                    .map(|t| t.return_pct)
                    .fold(f64::INFINITY, f64::min);
                let days: i64 = trades.iter().map(|t| t.holding_days()).sum();
                (sum / n, best, worst, days as f64 / n)
            } else {
                (0.0, 0.0, 0.0, 0.0)
            };

        Metrics {
            final_equity,
            total_return_pct,
            signal_count,
            total_trades,
            trades_won,
            trades_lost,
            win_rate,
            avg_return_pct,
            best_return_pct,
            worst_return_pct,
            max_drawdown_pct: compute_max_drawdown(&result.equity_curve) * 100.0,
            avg_holding_days,
        }
    }
}

fn compute_max_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    let Some(first) = equity_curve.first() else {
        return 0.0;
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
        }
    }

    max_dd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Account;
    use crate::domain::position::{ClosedTrade, ExitReason};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn make_equity_curve(values: &[f64]) -> Vec<EquityPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| EquityPoint {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                equity: v,
            })
            .collect()
    }

    fn make_trade(entry: f64, exit: f64, days: i64) -> ClosedTrade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ClosedTrade {
            shares: 100.0,
            entry_price: entry,
            exit_price: exit,
            entry_date,
            exit_date: entry_date + chrono::Duration::days(days),
            return_pct: (exit - entry) / entry * 100.0,
            exit_reason: ExitReason::BelowTrend,
        }
    }

    fn make_result(values: &[f64], trades: Vec<ClosedTrade>) -> BacktestResult {
        BacktestResult {
            initial_cash: 100_000.0,
            equity_curve: make_equity_curve(values),
            trades,
            final_account: Account::new(0.0),
        }
    }

    #[test]
    fn empty_result() {
        let m = Metrics::compute(&make_result(&[], vec![]), &[]);
        assert_eq!(m.final_equity, 100_000.0);
        assert_eq!(m.total_return_pct, 0.0);
        assert_eq!(m.total_trades, 0);
        assert_eq!(m.win_rate, 0.0);
        assert_eq!(m.max_drawdown_pct, 0.0);
    }

    #[test]
    fn cumulative_return_and_signal_count() {
        let result = make_result(&[100_000.0, 110_000.0, 120_000.0], vec![make_trade(10.0, 12.0, 2)]);
        let m = Metrics::compute(&result, &[false, true, false]);
        assert_relative_eq!(m.total_return_pct, 20.0, epsilon = 1e-9);
        assert_eq!(m.signal_count, 1);
        assert_eq!(m.trades_won, 1);
        assert_relative_eq!(m.win_rate, 1.0);
        assert_relative_eq!(m.avg_holding_days, 2.0);
    }

    #[test]
    fn trade_statistics() {
        let trades = vec![
            make_trade(10.0, 12.0, 3),
            make_trade(10.0, 9.0, 1),
            make_trade(10.0, 10.0, 2),
        ];
        let m = Metrics::compute(&make_result(&[100_000.0], trades), &[]);
        assert_eq!(m.total_trades, 3);
        assert_eq!(m.trades_won, 1);
        assert_eq!(m.trades_lost, 1);
        assert_relative_eq!(m.win_rate, 1.0 / 3.0);
        assert_relative_eq!(m.avg_return_pct, 10.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(m.best_return_pct, 20.0, epsilon = 1e-9);
        assert_relative_eq!(m.worst_return_pct, -10.0, epsilon = 1e-9);
    }

    #[test]
    fn drawdown_from_peak() {
        let curve = make_equity_curve(&[100.0, 120.0, 90.0, 130.0, 117.0]);
        assert_relative_eq!(compute_max_drawdown(&curve), 0.25, epsilon = 1e-12);
    }

    #[test]
    fn flat_curve_has_no_drawdown() {
        let curve = make_equity_curve(&[100.0; 5]);
        assert_eq!(compute_max_drawdown(&curve), 0.0);
    }
}
