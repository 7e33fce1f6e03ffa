//! INI file configuration adapter.

use crate::domain::error::BurstError;
use crate::ports::config_port::{ConfigPort, parse_bool};
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, BurstError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config
            .load(path)
            .map_err(|reason| BurstError::ConfigParse {
                file: path.display().to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, BurstError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| BurstError::ConfigParse {
                file: "<string>".into(),
                reason,
            })?;
        Ok(Self { config })
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.get_string(section, key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .as_deref()
            .and_then(parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SAMPLE: &str = r#"
[backtest]
symbol = 001255
start_date = 2024-01-01
end_date = 2026-02-24
initial_cash = 100000

[data]
dir = ./data
index = sh000001

[strategy]
ma_period = 7
momentum_floor = -20
warmup = strict
same_bar_reentry = yes
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("backtest", "symbol"),
            Some("001255".to_string())
        );
        assert_eq!(
            adapter.get_string("data", "index"),
            Some("sh000001".to_string())
        );
    }

    #[test]
    fn symbol_keeps_leading_zeros() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol").as_deref(), Some("001255"));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("backtest", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn blank_value_is_missing() {
        let adapter = FileConfigAdapter::from_string("[backtest]\nsymbol =\n").unwrap();
        assert_eq!(adapter.get_string("backtest", "symbol"), None);
    }

    #[test]
    fn numeric_getters() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_int("strategy", "ma_period", 0), 7);
        assert_eq!(adapter.get_usize("strategy", "ma_period", 0), 7);
        assert_eq!(adapter.get_double("strategy", "momentum_floor", 0.0), -20.0);
        assert_eq!(adapter.get_double("backtest", "initial_cash", 0.0), 100000.0);
    }

    #[test]
    fn numeric_getters_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nma_period = abc\nspan = -3\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "ma_period", 42), 42);
        assert_eq!(adapter.get_usize("strategy", "span", 6), 6);
        assert_eq!(adapter.get_double("strategy", "missing", 9.5), 9.5);
    }

    #[test]
    fn get_bool_values() {
        let adapter =
            FileConfigAdapter::from_string("[s]\na = true\nb = No\nc = 1\nd = maybe\n").unwrap();
        assert!(adapter.get_bool("s", "a", false));
        assert!(!adapter.get_bool("s", "b", true));
        assert!(adapter.get_bool("s", "c", false));
        assert!(adapter.get_bool("s", "d", true));
        assert!(!adapter.get_bool("s", "missing", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[report]\noutput_dir = /tmp/burst\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("report", "output_dir"),
            Some("/tmp/burst".to_string())
        );
    }

    #[test]
    fn from_file_missing_is_config_parse_error() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(result, Err(BurstError::ConfigParse { .. })));
    }
}
