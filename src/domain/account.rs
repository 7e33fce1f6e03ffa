//! Account state carried through the simulation and equity tracking.

use chrono::NaiveDate;

use super::position::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Simulator accumulator: Flat holds cash only, Long holds shares only.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub cash: f64,
    pub position: Option<Position>,
}

impl Account {
    pub fn new(initial_cash: f64) -> Self {
        Account {
            cash: initial_cash,
            position: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    pub fn shares(&self) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.shares)
    }

    pub fn stop_price(&self) -> Option<f64> {
        self.position.as_ref().map(|p| p.stop_price)
    }

    /// cash + mark-to-market value of any open position.
    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.as_ref().map_or(0.0, |p| p.market_value(price))
    }
}
