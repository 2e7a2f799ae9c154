//! INI file configuration adapter.

use configparser::ini::Ini;
use std::path::Path;

use crate::ports::config_port::ConfigPort;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn from_string_parses_all_sections() {
        let content = r#"
[data]
csv_path = /data/prices.csv

[strategy]
fast_period = 9
slow_period = 21
position_size = 2.5

[gate]
mode = rsi
overbought = 70.0
oversold = 30.0

[backtest]
initial_equity = 10000.0
risk_free_rate = 0.02
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "csv_path"),
            Some("/data/prices.csv".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "fast_period", 0), 9);
        assert_eq!(adapter.get_int("strategy", "slow_period", 0), 21);
        assert_eq!(adapter.get_double("strategy", "position_size", 0.0), 2.5);
        assert_eq!(adapter.get_string("gate", "mode"), Some("rsi".to_string()));
        assert_eq!(adapter.get_double("backtest", "initial_equity", 0.0), 10000.0);
        assert_eq!(adapter.get_double("backtest", "risk_free_rate", 0.0), 0.02);
    }

    #[test]
    fn missing_keys_return_none_or_default() {
        let adapter = FileConfigAdapter::from_string("[strategy]\nfast_period = 9\n").unwrap();
        assert_eq!(adapter.get_string("strategy", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("strategy", "missing", 42), 42);
        assert_eq!(adapter.get_double("strategy", "missing", 1.5), 1.5);
    }

    #[test]
    fn non_numeric_values_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nfast_period = fast\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "fast_period", 12), 12);
        assert_eq!(adapter.get_double("strategy", "fast_period", 1.0), 1.0);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[gate]\na = true\nb = yes\nc = 1\nd = false\ne = no\nf = 0\n",
        )
        .unwrap();
        assert!(adapter.get_bool("gate", "a", false));
        assert!(adapter.get_bool("gate", "b", false));
        assert!(adapter.get_bool("gate", "c", false));
        assert!(!adapter.get_bool("gate", "d", true));
        assert!(!adapter.get_bool("gate", "e", true));
        assert!(!adapter.get_bool("gate", "f", true));
        assert!(adapter.get_bool("gate", "missing", true));
    }

    #[test]
    fn from_file_reads_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[data]\ncsv_path = /tmp/bars.csv\n").unwrap();
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("data", "csv_path"),
            Some("/tmp/bars.csv".to_string())
        );
    }

    #[test]
    fn from_file_errors_on_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/emacross.ini").is_err());
    }
}
