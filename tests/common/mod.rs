#![allow(dead_code)]

use burstrader::domain::backtest::BacktestConfig;
use burstrader::domain::bar::{Bar, BarSeries};
use burstrader::domain::error::BurstError;
use burstrader::domain::indicator::{IndicatorFrame, IndicatorSeries, IndicatorType};
use burstrader::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BurstError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BurstError::Data {
                reason: reason.clone(),
            });
        }
        let bars: Vec<Bar> = self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if bars.is_empty() {
            return Err(BurstError::NoData {
                symbol: symbol.to_string(),
            });
        }
        BarSeries::new(bars)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BurstError> {
        Ok(self.data.get(symbol).and_then(|bars| {
            let first = bars.first()?;
            let last = bars.last()?;
            Some((first.date, last.date, bars.len()))
        }))
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The `i`-th calendar day from 2024-01-01.
pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Duration::days(i as i64)
}

pub fn make_bar(i: usize, close: f64, low: f64, index_close: f64) -> Bar {
    Bar {
        date: day(i),
        open: close,
        high: close,
        low,
        close,
        pct_chg: None,
        index_close: Some(index_close),
    }
}

/// Bars with high = close, low = close - 0.05 and a constant index.
pub fn series_from_closes(closes: &[f64], index_close: f64) -> BarSeries {
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(i, c, c - 0.05, index_close))
        .collect();
    BarSeries::new(bars).unwrap()
}

pub fn frame(ma: Vec<Option<f64>>, index_ma: Vec<Option<f64>>, q2: Vec<Option<f64>>) -> IndicatorFrame {
    IndicatorFrame {
        ma: IndicatorSeries {
            indicator_type: IndicatorType::Sma(7),
            values: ma,
        },
        index_ma: IndicatorSeries {
            indicator_type: IndicatorType::IndexSma(5),
            values: index_ma,
        },
        q2: IndicatorSeries {
            indicator_type: IndicatorType::Momentum(6),
            values: q2,
        },
    }
}

pub fn config(initial_cash: f64) -> BacktestConfig {
    BacktestConfig {
        symbol: "001255".into(),
        start_date: date(2024, 1, 1),
        end_date: date(2024, 12, 31),
        initial_cash,
    }
}

/// Strictly increasing closes with a single +10% day at bar 10.
pub fn breakout_closes(n: usize) -> Vec<f64> {
    let mut closes = Vec::with_capacity(n);
    for i in 0..n {
        let c = match i {
            0 => 10.0,
            10 => closes[9] * 1.10,
            _ => closes[i - 1] + 0.1,
        };
        closes.push(c);
    }
    closes
}

/// 42 closes: a slow climb, a +10% day at bar 14, a four-bar pullback,
/// a steady recovery to bar 35, then a slide.
pub const PULLBACK_CLOSES: [f64; 42] = [
    10.00, 10.05, 10.10, 10.15, 10.20, 10.25, 10.30, 10.35, 10.40, 10.45, //
    10.50, 10.55, 10.60, 10.65, 11.72, 11.57, 11.42, 11.27, 11.12, 11.20, //
    11.28, 11.36, 11.44, 11.52, 11.60, 11.68, 11.76, 11.84, 11.92, 12.00, //
    12.08, 12.16, 12.24, 12.32, 12.40, 12.48, 12.18, 11.88, 11.58, 11.28, //
    10.98, 10.68,
];

/// Index close for bar `i` of the pullback fixture: a steady climb.
pub fn pullback_index(i: usize) -> f64 {
    3000.0 + i as f64 * 5.0
}

/// Bars for `PULLBACK_CLOSES` with high = close + 0.02, low = close - 0.05
/// and a rising index.
pub fn pullback_bars() -> Vec<Bar> {
    PULLBACK_CLOSES
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            date: day(i),
            open: c,
            high: c + 0.02,
            low: c - 0.05,
            close: c,
            pct_chg: None,
            index_close: Some(pullback_index(i)),
        })
        .collect()
}
