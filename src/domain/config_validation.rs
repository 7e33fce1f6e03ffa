//! Configuration validation.
//!
//! Validates all config fields before any data is read.

use crate::domain::error::BurstError;
use crate::domain::strategy::{WarmupPolicy, ZeroDenominatorPolicy};
use crate::ports::config_port::{ConfigPort, parse_bool};
use chrono::NaiveDate;

pub const DEFAULT_INITIAL_CASH: f64 = 100_000.0;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BurstError> {
    validate_initial_cash(config)?;
    validate_dates(config)?;
    validate_symbol(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BurstError> {
    for key in ["ma_period", "index_ma_period", "momentum_span", "limit_up_lookback"] {
        validate_period(config, key)?;
    }
    for key in ["limit_up_pct", "momentum_floor", "max_extension_pct"] {
        validate_number(config, "strategy", key)?;
    }
    validate_policies(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> BurstError {
    BurstError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_number(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), BurstError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(()),
        Ok(_) => Err(invalid(section, key, format!("{} must be finite", key))),
        Err(_) => Err(invalid(
            section,
            key,
            format!("'{}' is not a number", raw.trim()),
        )),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), BurstError> {
    validate_number(config, "backtest", "initial_cash")?;
    let value = config.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH);
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BurstError> {
    let start_str = config.get_string("backtest", "start_date");
    let end_str = config.get_string("backtest", "end_date");

    let start_date = parse_date(start_str.as_deref(), "start_date")?;
    let end_date = parse_date(end_str.as_deref(), "end_date")?;

    if start_date > end_date {
        return Err(invalid(
            "backtest",
            "start_date",
            "start_date must not be after end_date",
        ));
    }
    Ok(())
}

pub fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDate, BurstError> {
    match value {
        None => Err(BurstError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
            invalid(
                "backtest",
                field,
                format!("invalid {} format, expected YYYY-MM-DD", field),
            )
        }),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), BurstError> {
    match config.get_string("backtest", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BurstError::ConfigMissing {
            section: "backtest".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_period(config: &dyn ConfigPort, key: &str) -> Result<(), BurstError> {
    let Some(raw) = config.get_string("strategy", key) else {
        return Ok(());
    };
    match raw.trim().parse::<i64>() {
        Ok(v) if v >= 1 => Ok(()),
        Ok(_) => Err(invalid("strategy", key, format!("{} must be at least 1", key))),
        Err(_) => Err(invalid(
            "strategy",
            key,
            format!("'{}' is not an integer", raw.trim()),
        )),
    }
}

fn validate_policies(config: &dyn ConfigPort) -> Result<(), BurstError> {
    if let Some(s) = config.get_string("strategy", "warmup") {
        s.parse::<WarmupPolicy>()
            .map_err(|reason| invalid("strategy", "warmup", reason))?;
    }
    if let Some(s) = config.get_string("strategy", "momentum_zero") {
        s.parse::<ZeroDenominatorPolicy>()
            .map_err(|reason| invalid("strategy", "momentum_zero", reason))?;
    }
    if let Some(s) = config.get_string("strategy", "same_bar_reentry") {
        if parse_bool(&s).is_none() {
            return Err(invalid(
                "strategy",
                "same_bar_reentry",
                "expected true or false",
            ));
        }
    }
    Ok(())
}
