//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for burstrader.
#[derive(Debug, thiserror::Error)]
pub enum BurstError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("bar {index} dated {current} does not follow {previous}")]
    UnorderedDates {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid bar on {date}: {reason}")]
    InvalidBar { date: NaiveDate, reason: String },

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BurstError> for std::process::ExitCode {
    fn from(err: &BurstError) -> Self {
        let code: u8 = match err {
            BurstError::Io(_) => 1,
            BurstError::ConfigParse { .. }
            | BurstError::ConfigMissing { .. }
            | BurstError::ConfigInvalid { .. } => 2,
            BurstError::Data { .. } => 3,
            BurstError::UnorderedDates { .. } | BurstError::InvalidBar { .. } => 4,
            BurstError::NoData { .. } => 5,
            BurstError::Report { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
