use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = ".bike-dashboard.yml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub data: DataPaths,
    pub chart_scope: ChartScope,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DataPaths {
    pub daily: PathBuf,
    pub hourly: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

/// Which rows feed the charts. Metrics always use the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChartScope {
    /// Charts follow the year and date range filter
    #[default]
    Selection,
    /// Charts always cover the full tables
    All,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            daily: PathBuf::from("data/day.csv"),
            hourly: PathBuf::from("data/hour.csv"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Config> {
        let reader = File::open(path)
            .with_context(|| format!("Failed to open config file {}", path.display()))?;
        let config: Config = serde_yaml::from_reader(reader)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Explicit path must exist; otherwise the default file is optional
    pub fn load(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Config::from_file(path)
            }
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    log::info!("using config file {}", default.display());
                    Config::from_file(default)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config() {
        let content = r##"data:
  daily: /srv/bike/day.csv
  hourly: /srv/bike/hour.csv
chart_scope: all
server:
  addr: 127.0.0.1:8080
"##;
        let config: Config = serde_yaml::from_str(content).unwrap();
        println!("{:?}", config);
        assert_eq!(config.data.daily, PathBuf::from("/srv/bike/day.csv"));
        assert_eq!(config.data.hourly, PathBuf::from("/srv/bike/hour.csv"));
        assert_eq!(config.chart_scope, ChartScope::All);
        assert_eq!(config.server.addr, "127.0.0.1:8080");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let content = r##"data:
  daily: day.csv
"##;
        let config: Config = serde_yaml::from_str(content).unwrap();
        assert_eq!(config.data.daily, PathBuf::from("day.csv"));
        assert_eq!(config.data.hourly, PathBuf::from("data/hour.csv"));
        assert_eq!(config.chart_scope, ChartScope::Selection);
        assert_eq!(config.server.addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_unknown_scope_is_rejected() {
        let content = "chart_scope: everything\n";
        assert!(serde_yaml::from_str::<Config>(content).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/bike.yml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
