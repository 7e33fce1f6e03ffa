//! CSV report adapter implementing ReportPort.
//!
//! Writes two files into the output directory: `bars.csv`, one row per bar
//! with the indicator overlays, signal flag and equity, and `trades.csv`,
//! one row per closed trade.

use std::fs;
use std::path::Path;

use crate::domain::backtest::BacktestReport;
use crate::domain::error::BurstError;
use crate::ports::report_port::ReportPort;
use tracing::info;

pub const BARS_FILE: &str = "bars.csv";
pub const TRADES_FILE: &str = "trades.csv";

fn report_err(e: impl std::fmt::Display) -> BurstError {
    BurstError::Report {
        reason: e.to_string(),
    }
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    fn write_bars(report: &BacktestReport, path: &Path) -> Result<(), BurstError> {
        let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
        wtr.write_record([
            "date",
            "close",
            "index_close",
            report.frame.ma.indicator_type.to_string().as_str(),
            report.frame.index_ma.indicator_type.to_string().as_str(),
            report.frame.q2.indicator_type.to_string().as_str(),
            "xg",
            "equity",
        ])
        .map_err(report_err)?;

        let curve = &report.result.equity_curve;
        for (i, bar) in report.series.bars().iter().enumerate() {
            let signal = report.signals.get(i).copied().unwrap_or(false);
            wtr.write_record([
                bar.date.to_string(),
                format!("{:.4}", bar.close),
                opt(bar.index_close),
                opt(report.frame.ma.get(i)),
                opt(report.frame.index_ma.get(i)),
                opt(report.frame.q2.get(i)),
                u8::from(signal).to_string(),
                opt(curve.get(i).map(|p| p.equity)),
            ])
            .map_err(report_err)?;
        }
        wtr.flush()?;
        Ok(())
    }

    fn write_trades(report: &BacktestReport, path: &Path) -> Result<(), BurstError> {
        let mut wtr = csv::Writer::from_path(path).map_err(report_err)?;
        wtr.write_record([
            "entry_date",
            "entry_price",
            "exit_date",
            "exit_price",
            "shares",
            "return_pct",
            "exit_reason",
        ])
        .map_err(report_err)?;

        for trade in &report.result.trades {
            wtr.write_record([
                trade.entry_date.to_string(),
                format!("{:.4}", trade.entry_price),
                trade.exit_date.to_string(),
                format!("{:.4}", trade.exit_price),
                format!("{:.4}", trade.shares),
                format!("{:.4}", trade.return_pct),
                trade.exit_reason.to_string(),
            ])
            .map_err(report_err)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &BacktestReport, output: &Path) -> Result<(), BurstError> {
        fs::create_dir_all(output).map_err(|e| BurstError::Report {
            reason: format!("failed to create {}: {}", output.display(), e),
        })?;
        Self::write_bars(report, &output.join(BARS_FILE))?;
        Self::write_trades(report, &output.join(TRADES_FILE))?;
        info!(
            dir = %output.display(),
            bars = report.series.len(),
            trades = report.result.trades.len(),
            "report written"
        );
        Ok(())
    }
}
