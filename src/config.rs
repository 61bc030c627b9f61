use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::report::{MetricFamily, SamplingPolicy};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sampling: SamplingConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub interval_ms: u64,
    pub timeout_ms: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            interval_ms: 1000,
            timeout_ms: 5000,
        }
    }
}

impl SamplingConfig {
    pub fn policy(&self) -> SamplingPolicy {
        SamplingPolicy {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub families: Vec<MetricFamily>,
    pub format: OutputFormat,
    pub max_name_width: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            families: MetricFamily::ALL.to_vec(),
            format: OutputFormat::Text,
            max_name_width: 40,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "warn".to_string(),
            json: false,
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostprobe").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.sampling.interval_ms, 1000);
        assert_eq!(config.sampling.timeout_ms, 5000);
        assert_eq!(config.report.families, MetricFamily::ALL.to_vec());
        assert_eq!(config.report.format, OutputFormat::Text);
        assert_eq!(config.report.max_name_width, 40);
        assert_eq!(config.logging.level, "warn");
        assert!(!config.logging.json);
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[sampling]
interval_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.sampling.interval_ms, 250);
        // Other fields should be defaults
        assert_eq!(config.sampling.timeout_ms, 5000);
        assert_eq!(config.report.format, OutputFormat::Text);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[sampling]
interval_ms = 500
timeout_ms = 2000

[report]
families = ["memory", "filesystems"]
format = "json"
max_name_width = 16

[logging]
level = "debug"
json = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.sampling.policy(),
            SamplingPolicy {
                interval: Duration::from_millis(500),
                timeout: Duration::from_millis(2000),
            }
        );
        assert_eq!(
            config.report.families,
            vec![MetricFamily::Memory, MetricFamily::Filesystems]
        );
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.max_name_width, 16);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn unknown_family_falls_back_to_defaults() {
        let config = load_from_str_for_test("[report]\nfamilies = [\"gpu\"]\n");
        assert_eq!(config.report.families, MetricFamily::ALL.to_vec());
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.sampling.interval_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("hostprobe_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.sampling.interval_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }

    fn load_from_str_for_test(contents: &str) -> Config {
        let temp = std::env::temp_dir().join(format!(
            "hostprobe_test_{}.toml",
            std::process::id()
        ));
        std::fs::write(&temp, contents).unwrap();
        let config = load_config_from_path(&temp);
        let _ = std::fs::remove_file(&temp);
        config
    }
}
