//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::CsvReportAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestReport, run_strategy};
use crate::domain::config_validation::{
    DEFAULT_INITIAL_CASH, parse_date, validate_backtest_config, validate_strategy_config,
};
use crate::domain::error::BurstError;
use crate::domain::metrics::Metrics;
use crate::domain::strategy::{StrategyParams, WarmupPolicy, ZeroDenominatorPolicy};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_INDEX_SYMBOL: &str = "sh000001";
pub const DEFAULT_OUTPUT_DIR: &str = "report";

#[derive(Parser, Debug)]
#[command(name = "burstrader", about = "Limit-up breakout strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest and write the bar and trade reports
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// List the bars on which the entry signal fired
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
    },
    /// Validate a configuration file without reading data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the available data range for a symbol
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct Overrides {
    #[arg(long)]
    pub symbol: Option<String>,
    /// First date, YYYY-MM-DD
    #[arg(long)]
    pub start: Option<String>,
    /// Last date, YYYY-MM-DD
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long)]
    pub cash: Option<f64>,
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Backtest { config, overrides } => run_backtest(&config, &overrides),
        Command::Signals { config, overrides } => run_signals(&config, &overrides),
        Command::Validate { config } => run_validate(&config),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, BurstError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

fn invalid(key: &str, reason: &str) -> BurstError {
    BurstError::ConfigInvalid {
        section: "backtest".into(),
        key: key.into(),
        reason: reason.into(),
    }
}

/// Resolve the run parameters from config and overrides, checking the
/// same constraints as `validate_backtest_config`.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<BacktestConfig, BurstError> {
    let symbol = overrides
        .symbol
        .clone()
        .or_else(|| config.get_string("backtest", "symbol"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| BurstError::ConfigMissing {
            section: "backtest".into(),
            key: "symbol".into(),
        })?;

    let start_str = overrides
        .start
        .clone()
        .or_else(|| config.get_string("backtest", "start_date"));
    let end_str = overrides
        .end
        .clone()
        .or_else(|| config.get_string("backtest", "end_date"));
    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;
    if start_date > end_date {
        return Err(invalid("start_date", "start_date must not be after end_date"));
    }

    let initial_cash = match overrides.cash {
        Some(cash) => cash,
        None => match config.get_string("backtest", "initial_cash") {
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|_| invalid("initial_cash", "initial_cash must be a number"))?,
            None => DEFAULT_INITIAL_CASH,
        },
    };
    if !initial_cash.is_finite() || initial_cash <= 0.0 {
        return Err(invalid("initial_cash", "initial_cash must be positive"));
    }

    Ok(BacktestConfig {
        symbol,
        start_date,
        end_date,
        initial_cash,
    })
}

pub fn build_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, BurstError> {
    validate_strategy_config(config)?;
    let defaults = StrategyParams::default();

    let policy_err = |key: &str, reason: String| BurstError::ConfigInvalid {
        section: "strategy".into(),
        key: key.into(),
        reason,
    };
    let warmup = match config.get_string("strategy", "warmup") {
        Some(s) => s
            .parse::<WarmupPolicy>()
            .map_err(|e| policy_err("warmup", e))?,
        None => defaults.warmup,
    };
    let momentum_zero = match config.get_string("strategy", "momentum_zero") {
        Some(s) => s
            .parse::<ZeroDenominatorPolicy>()
            .map_err(|e| policy_err("momentum_zero", e))?,
        None => defaults.momentum_zero,
    };

    Ok(StrategyParams {
        ma_period: config.get_usize("strategy", "ma_period", defaults.ma_period),
        index_ma_period: config.get_usize("strategy", "index_ma_period", defaults.index_ma_period),
        momentum_span: config.get_usize("strategy", "momentum_span", defaults.momentum_span),
        limit_up_pct: config.get_double("strategy", "limit_up_pct", defaults.limit_up_pct),
        limit_up_lookback: config.get_usize(
            "strategy",
            "limit_up_lookback",
            defaults.limit_up_lookback,
        ),
        momentum_floor: config.get_double("strategy", "momentum_floor", defaults.momentum_floor),
        max_extension_pct: config.get_double(
            "strategy",
            "max_extension_pct",
            defaults.max_extension_pct,
        ),
        warmup,
        momentum_zero,
        same_bar_reentry: config.get_bool(
            "strategy",
            "same_bar_reentry",
            defaults.same_bar_reentry,
        ),
    })
}

pub fn build_data_adapter(config: &dyn ConfigPort, data_dir: Option<&Path>) -> CsvAdapter {
    let dir = data_dir
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
    let index = config
        .get_string("data", "index")
        .unwrap_or_else(|| DEFAULT_INDEX_SYMBOL.to_string());
    CsvAdapter::new(dir, index)
}

pub fn resolve_output(config: &dyn ConfigPort, output: Option<&Path>) -> PathBuf {
    output
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
}

/// Fetch, evaluate and simulate one instrument.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    bt_config: &BacktestConfig,
    params: &StrategyParams,
) -> Result<(BacktestReport, Metrics), BurstError> {
    info!(
        symbol = %bt_config.symbol,
        start = %bt_config.start_date,
        end = %bt_config.end_date,
        "fetching bars"
    );
    let series = data_port.fetch_series(
        &bt_config.symbol,
        bt_config.start_date,
        bt_config.end_date,
    )?;

    if series.len() < params.min_bars() {
        info!(
            bars = series.len(),
            required = params.min_bars(),
            "series shorter than the signal window, no entries possible"
        );
    }

    info!(bars = series.len(), "running backtest");
    let report = run_strategy(series, bt_config, params);
    let metrics = Metrics::compute(&report.result, &report.signals);
    info!(
        signals = metrics.signal_count,
        trades = metrics.total_trades,
        final_equity = metrics.final_equity,
        "backtest complete"
    );
    Ok((report, metrics))
}

pub fn format_summary(report: &BacktestReport, metrics: &Metrics) -> String {
    let mut out = String::new();
    let cfg = &report.config;
    let _ = writeln!(out, "=== {} ({} to {}) ===", cfg.symbol, cfg.start_date, cfg.end_date);
    let _ = writeln!(out, "Bars:             {}", report.series.len());
    let _ = writeln!(out, "Initial Cash:     {:.2}", cfg.initial_cash);
    let _ = writeln!(out, "Final Equity:     {:.2}", metrics.final_equity);
    let _ = writeln!(out, "Total Return:     {:.2}%", metrics.total_return_pct);
    let _ = writeln!(out, "Signals:          {}", metrics.signal_count);
    let _ = writeln!(out, "Total Trades:     {}", metrics.total_trades);
    let _ = writeln!(out, "Win Rate:         {:.1}%", metrics.win_rate * 100.0);
    let _ = writeln!(out, "Avg Trade Return: {:.2}%", metrics.avg_return_pct);
    let _ = writeln!(out, "Max Drawdown:     -{:.1}%", metrics.max_drawdown_pct);

    if !report.result.trades.is_empty() {
        let _ = writeln!(out, "\n=== Trades ===");
        for t in &report.result.trades {
            let _ = writeln!(
                out,
                "  {} @ {:.2} -> {} @ {:.2}  {:+.2}%  ({})",
                t.entry_date, t.entry_price, t.exit_date, t.exit_price, t.return_pct, t.exit_reason
            );
        }
    }

    if let (Some(pos), Some(last)) = (report.result.open_position(), report.series.bars().last()) {
        let _ = writeln!(
            out,
            "\nOpen Position: {:.2} shares since {} @ {:.2}, stop {:.2}, unrealized {:+.2}%",
            pos.shares,
            pos.entry_date,
            pos.entry_price,
            pos.stop_price,
            pos.unrealized_return_pct(last.close)
        );
    }
    out
}

pub fn format_signals(report: &BacktestReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12}{:>10}{:>10}{:>10}",
        "date",
        "close",
        report.frame.ma.indicator_type.to_string(),
        report.frame.q2.indicator_type.to_string()
    );
    let fmt_opt = |v: Option<f64>| v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".into());
    for (i, bar) in report.series.bars().iter().enumerate() {
        if !report.signals.get(i).copied().unwrap_or(false) {
            continue;
        }
        let _ = writeln!(
            out,
            "{:<12}{:>10.2}{:>10}{:>10}",
            bar.date.to_string(),
            bar.close,
            fmt_opt(report.frame.ma.get(i)),
            fmt_opt(report.frame.q2.get(i))
        );
    }
    let _ = writeln!(out, "{} signal(s)", report.signal_count());
    out
}

fn prepare(
    config_path: &Path,
    overrides: &Overrides,
) -> Result<(FileConfigAdapter, BacktestConfig, StrategyParams), BurstError> {
    let config = load_config(config_path)?;
    let bt_config = build_backtest_config(&config, overrides)?;
    let params = build_strategy_params(&config)?;
    Ok((config, bt_config, params))
}

fn run_backtest(config_path: &Path, overrides: &Overrides) -> Result<(), BurstError> {
    let (config, bt_config, params) = prepare(config_path, overrides)?;
    let data = build_data_adapter(&config, overrides.data_dir.as_deref());

    let (report, metrics) = run_backtest_pipeline(&data, &bt_config, &params)?;
    print!("{}", format_summary(&report, &metrics));

    let output = resolve_output(&config, overrides.output.as_deref());
    CsvReportAdapter.write(&report, &output)?;
    println!("\nReport written to: {}", output.display());
    Ok(())
}

fn run_signals(config_path: &Path, overrides: &Overrides) -> Result<(), BurstError> {
    let (config, bt_config, params) = prepare(config_path, overrides)?;
    let data = build_data_adapter(&config, overrides.data_dir.as_deref());

    let (report, _) = run_backtest_pipeline(&data, &bt_config, &params)?;
    print!("{}", format_signals(&report));
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), BurstError> {
    let config = load_config(config_path)?;
    validate_backtest_config(&config)?;
    let params = build_strategy_params(&config)?;
    let bt_config = build_backtest_config(&config, &Overrides::default())?;

    println!("Configuration is valid.");
    println!(
        "  {} from {} to {}, initial cash {:.2}",
        bt_config.symbol, bt_config.start_date, bt_config.end_date, bt_config.initial_cash
    );
    println!(
        "  MA({}) INDEX_MA({}) Q2({}), limit-up > {}% within {} bars, floor {}, extension <= {}%",
        params.ma_period,
        params.index_ma_period,
        params.momentum_span,
        params.limit_up_pct,
        params.limit_up_lookback,
        params.momentum_floor,
        params.max_extension_pct
    );
    println!(
        "  warmup {}, momentum_zero {}, same_bar_reentry {}",
        params.warmup, params.momentum_zero, params.same_bar_reentry
    );
    Ok(())
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> Result<(), BurstError> {
    let config = load_config(config_path)?;
    let data = build_data_adapter(&config, None);
    let index = config
        .get_string("data", "index")
        .unwrap_or_else(|| DEFAULT_INDEX_SYMBOL.to_string());

    let symbol = match symbol.map(str::to_string) {
        Some(s) => s,
        None => config
            .get_string("backtest", "symbol")
            .ok_or_else(|| BurstError::ConfigMissing {
                section: "backtest".into(),
                key: "symbol".into(),
            })?,
    };

    for s in [symbol.as_str(), index.as_str()] {
        match data.get_data_range(s)? {
            Some((first, last, count)) => println!("{}: {} bars, {} to {}", s, count, first, last),
            None => println!("{}: no data found", s),
        }
    }
    Ok(())
}
