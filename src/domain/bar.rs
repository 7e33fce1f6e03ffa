//! Daily bar representation and the validated bar series.

use crate::domain::error::BurstError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Percent change of close vs the prior close. Derived when absent.
    pub pct_chg: Option<f64>,
    /// Same-date close of the reference market index.
    pub index_close: Option<f64>,
}

impl Bar {
    /// (close - prev_close) / prev_close * 100, undefined for a zero prior close.
    pub fn change_pct(&self, prev_close: f64) -> Option<f64> {
        if prev_close == 0.0 {
            return None;
        }
        Some((self.close - prev_close) / prev_close * 100.0)
    }
}

/// An ordered, date-indexed sequence of bars.
///
/// Construction enforces strictly increasing dates, derives missing
/// `pct_chg` values and forward-fills missing index closes. A bar with no
/// index observation at or before it falls back to its own close.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(mut bars: Vec<Bar>) -> Result<Self, BurstError> {
        for (i, bar) in bars.iter().enumerate() {
            if ![bar.open, bar.high, bar.low, bar.close]
                .iter()
                .all(|v| v.is_finite())
            {
                return Err(BurstError::InvalidBar {
                    date: bar.date,
                    reason: "non-finite price".into(),
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(BurstError::UnorderedDates {
                    index: i,
                    previous: bars[i - 1].date,
                    current: bar.date,
                });
            }
        }

        let mut last_index: Option<f64> = None;
        for i in 0..bars.len() {
            if bars[i].pct_chg.is_none() && i > 0 {
                let prev_close = bars[i - 1].close;
                bars[i].pct_chg = bars[i].change_pct(prev_close);
            }
            match bars[i].index_close.filter(|v| v.is_finite()) {
                Some(v) => last_index = Some(v),
                None => bars[i].index_close = Some(last_index.unwrap_or(bars[i].close)),
            }
        }

        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self { bars: Vec::new() }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn index_closes(&self) -> Vec<f64> {
        self.bars
            .iter()
            .map(|b| b.index_close.unwrap_or(b.close))
            .collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

/// Attach to each bar the most recent index close dated on or before it.
/// Bars older than every index observation are left empty.
pub fn align_index(bars: &mut [Bar], index: &[(NaiveDate, f64)]) {
    let by_date: BTreeMap<NaiveDate, f64> = index
        .iter()
        .copied()
        .filter(|(_, close)| close.is_finite())
        .collect();
    for bar in bars.iter_mut() {
        bar.index_close = by_date.range(..=bar.date).next_back().map(|(_, &c)| c);
    }
}
