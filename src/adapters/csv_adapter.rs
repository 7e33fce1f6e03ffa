//! CSV file data adapter.
//!
//! One file per instrument, `<dir>/<symbol>.csv`. The reference index lives
//! in the same directory under its own symbol and only needs `date` and
//! `close` columns.

use crate::domain::bar::{Bar, BarSeries, align_index};
use crate::domain::error::BurstError;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Header spellings accepted for each canonical column.
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("date", "date"),
    ("trade_date", "date"),
    ("日期", "date"),
    ("open", "open"),
    ("开盘", "open"),
    ("high", "high"),
    ("最高", "high"),
    ("low", "low"),
    ("最低", "low"),
    ("close", "close"),
    ("收盘", "close"),
    ("pct_chg", "pct_chg"),
    ("change_pct", "pct_chg"),
    ("涨跌幅", "pct_chg"),
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

fn canonical(header: &str) -> Option<&'static str> {
    let header = header.trim().trim_start_matches('\u{feff}');
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(header))
        .map(|(_, name)| *name)
}

struct Columns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    pct_chg: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord, path: &str) -> Result<Self, BurstError> {
        let find = |name: &str| headers.iter().position(|h| canonical(h) == Some(name));
        let require = |name: &str| {
            find(name).ok_or_else(|| BurstError::Data {
                reason: format!("{}: missing {} column", path, name),
            })
        };
        Ok(Self {
            date: require("date")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            close: require("close")?,
            pct_chg: find("pct_chg"),
        })
    }

    fn require_ohlc(&self, path: &str) -> Result<(usize, usize, usize), BurstError> {
        match (self.open, self.high, self.low) {
            (Some(o), Some(h), Some(l)) => Ok((o, h, l)),
            _ => Err(BurstError::Data {
                reason: format!("{}: missing open/high/low columns", path),
            }),
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, BurstError> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| BurstError::Data {
            reason: format!("invalid date '{}'", raw),
        })
}

fn field<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str, BurstError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| BurstError::Data {
            reason: format!("missing {} value", name),
        })
}

fn parse_price(record: &StringRecord, idx: usize, name: &str) -> Result<f64, BurstError> {
    let raw = field(record, idx, name)?;
    raw.parse().map_err(|_| BurstError::Data {
        reason: format!("invalid {} value '{}'", name, raw),
    })
}

fn parse_optional(record: &StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| record.get(i))
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

pub struct CsvAdapter {
    base_path: PathBuf,
    index_symbol: String,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf, index_symbol: impl Into<String>) -> Self {
        Self {
            base_path,
            index_symbol: index_symbol.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn open(&self, symbol: &str) -> Result<(csv::Reader<fs::File>, Columns, String), BurstError> {
        let path = self.csv_path(symbol);
        let display = path.display().to_string();
        if !path.exists() {
            return Err(BurstError::NoData {
                symbol: symbol.to_string(),
            });
        }
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|e| BurstError::Data {
                reason: format!("failed to read {}: {}", display, e),
            })?;
        let headers = rdr.headers().map_err(|e| BurstError::Data {
            reason: format!("{}: {}", display, e),
        })?;
        let columns = Columns::from_headers(headers, &display)?;
        Ok((rdr, columns, display))
    }

    fn read_bars(&self, symbol: &str) -> Result<Vec<Bar>, BurstError> {
        let (mut rdr, columns, display) = self.open(symbol)?;
        let (open_idx, high_idx, low_idx) = columns.require_ohlc(&display)?;
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| BurstError::Data {
                reason: format!("{}: CSV parse error: {}", display, e),
            })?;
            let date = parse_date(field(&record, columns.date, "date")?)?;
            bars.push(Bar {
                date,
                open: parse_price(&record, open_idx, "open")?,
                high: parse_price(&record, high_idx, "high")?,
                low: parse_price(&record, low_idx, "low")?,
                close: parse_price(&record, columns.close, "close")?,
                pct_chg: parse_optional(&record, columns.pct_chg),
                index_close: None,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    fn read_index(&self, end_date: NaiveDate) -> Result<Vec<(NaiveDate, f64)>, BurstError> {
        let (mut rdr, columns, display) = match self.open(&self.index_symbol) {
            Ok(opened) => opened,
            Err(BurstError::NoData { .. }) => {
                warn!(
                    index = %self.index_symbol,
                    "index file not found, falling back to instrument close"
                );
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut index = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| BurstError::Data {
                reason: format!("{}: CSV parse error: {}", display, e),
            })?;
            let date = parse_date(field(&record, columns.date, "date")?)?;
            if date > end_date {
                continue;
            }
            if let Some(close) = parse_optional(&record, Some(columns.close)) {
                index.push((date, close));
            }
        }
        Ok(index)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_series(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<BarSeries, BurstError> {
        let mut bars: Vec<Bar> = self
            .read_bars(symbol)?
            .into_iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .collect();

        if bars.is_empty() {
            return Err(BurstError::NoData {
                symbol: symbol.to_string(),
            });
        }

        let index = self.read_index(end_date)?;
        align_index(&mut bars, &index);
        debug!(
            symbol,
            bars = bars.len(),
            index_rows = index.len(),
            "loaded series"
        );

        BarSeries::new(bars)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, BurstError> {
        let (mut rdr, columns, display) = match self.open(symbol) {
            Ok(opened) => opened,
            Err(BurstError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let mut range: Option<(NaiveDate, NaiveDate, usize)> = None;
        for result in rdr.records() {
            let record = result.map_err(|e| BurstError::Data {
                reason: format!("{}: CSV parse error: {}", display, e),
            })?;
            let date = parse_date(field(&record, columns.date, "date")?)?;
            range = Some(match range {
                None => (date, date, 1),
                Some((first, last, count)) => (first.min(date), last.max(date), count + 1),
            });
        }
        Ok(range)
    }
}
