//! Open position and closed trade records.

use chrono::NaiveDate;
use std::fmt;

/// A long holding opened with all available cash.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub shares: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    /// Low of the entry bar. Fixed for the life of the position.
    pub stop_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// Close fell below the entry bar's low.
    StopPrice,
    /// Close fell below the trend average.
    BelowTrend,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::StopPrice => write!(f, "stop"),
            ExitReason::BelowTrend => write!(f, "trend"),
        }
    }
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    pub fn unrealized_return_pct(&self, price: f64) -> f64 {
        return_pct(self.entry_price, price)
    }

    /// Exit trigger for a bar closing at `close` with trend average `ma`.
    /// An undefined average never triggers the trend exit.
    pub fn exit_reason(&self, close: f64, ma: Option<f64>) -> Option<ExitReason> {
        if close < self.stop_price {
            Some(ExitReason::StopPrice)
        } else if ma.is_some_and(|ma| close < ma) {
            Some(ExitReason::BelowTrend)
        } else {
            None
        }
    }

    pub fn close(self, exit_date: NaiveDate, exit_price: f64, reason: ExitReason) -> ClosedTrade {
        ClosedTrade {
            shares: self.shares,
            entry_price: self.entry_price,
            exit_price,
            entry_date: self.entry_date,
            exit_date,
            return_pct: return_pct(self.entry_price, exit_price),
            exit_reason: reason,
        }
    }
}

/// (exit - entry) / entry * 100, zero for a zero entry price.
pub fn return_pct(entry_price: f64, exit_price: f64) -> f64 {
    if entry_price == 0.0 {
        return 0.0;
    }
    (exit_price - entry_price) / entry_price * 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub shares: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub return_pct: f64,
    pub exit_reason: ExitReason,
}

impl ClosedTrade {
    pub fn pnl(&self) -> f64 {
        self.shares * (self.exit_price - self.entry_price)
    }

    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_position() -> Position {
        Position {
            shares: 10_000.0,
            entry_price: 10.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            stop_price: 9.5,
        }
    }

    #[test]
    fn market_value() {
        let pos = sample_position();
        assert_relative_eq!(pos.market_value(12.0), 120_000.0);
    }

    #[test]
    fn unrealized_return() {
        let pos = sample_position();
        assert_relative_eq!(pos.unrealized_return_pct(11.0), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn stop_takes_precedence() {
        let pos = sample_position();
        assert_eq!(pos.exit_reason(9.4, Some(10.5)), Some(ExitReason::StopPrice));
    }

    #[test]
    fn stop_is_strictly_below() {
        let pos = sample_position();
        assert_eq!(pos.exit_reason(9.5, None), None);
    }

    #[test]
    fn below_trend_exit() {
        let pos = sample_position();
        assert_eq!(pos.exit_reason(10.0, Some(10.2)), Some(ExitReason::BelowTrend));
        assert_eq!(pos.exit_reason(10.2, Some(10.2)), None);
    }

    #[test]
    fn undefined_trend_never_exits() {
        let pos = sample_position();
        assert_eq!(pos.exit_reason(9.6, None), None);
    }

    #[test]
    fn close_builds_trade() {
        let trade = sample_position().close(
            NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(),
            12.0,
            ExitReason::BelowTrend,
        );
        assert_relative_eq!(trade.return_pct, 20.0, epsilon = 1e-9);
        assert_relative_eq!(trade.pnl(), 20_000.0, epsilon = 1e-6);
        assert_eq!(trade.holding_days(), 5);
        assert_eq!(trade.exit_reason, ExitReason::BelowTrend);
    }

    #[test]
    fn return_pct_zero_entry() {
        assert_eq!(return_pct(0.0, 5.0), 0.0);
    }

    #[test]
    fn exit_reason_display() {
        assert_eq!(ExitReason::StopPrice.to_string(), "stop");
        assert_eq!(ExitReason::BelowTrend.to_string(), "trend");
    }
}
