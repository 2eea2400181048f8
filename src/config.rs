use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data::loader::SUPPORTED_EXTENSIONS;
use crate::data::provider::{FileProvider, ReturnsProvider, SeedProvider};
use crate::error::{Error, Result};

/// Where the dashboard gets its filings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum DataSource {
    /// Built-in sample dataset.
    #[default]
    Seed,
    /// A `.parquet`, `.json` or `.csv` export.
    File { path: PathBuf },
}

/// Dashboard configuration.
///
/// ```json
/// { "data_source": { "kind": "file", "path": "filings.parquet" }, "log_filter": "info" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_source: DataSource,
    /// `env_logger` filter directive; `RUST_LOG` applies when unset.
    pub log_filter: Option<String>,
}

impl DashboardConfig {
    /// Read a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: DashboardConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that a configured data file exists and has a known format.
    pub fn validate(&self) -> Result<()> {
        let DataSource::File { path } = &self.data_source else {
            return Ok(());
        };

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(Error::Config(format!(
                "Unsupported data file format: {}",
                path.display()
            )));
        }

        if !path.is_file() {
            return Err(Error::Config(format!(
                "Data file does not exist: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// Build the provider named by `data_source`.
    pub fn provider(&self) -> Box<dyn ReturnsProvider> {
        match &self.data_source {
            DataSource::Seed => Box::new(SeedProvider::new()),
            DataSource::File { path } => Box::new(FileProvider::new(path.clone())),
        }
    }

    /// Install `env_logger`, honoring `log_filter` when set.
    ///
    /// Safe to call more than once; later calls are ignored.
    pub fn init_logging(&self) {
        let mut builder = match &self.log_filter {
            Some(filter) => {
                let mut b = env_logger::Builder::new();
                b.parse_filters(filter);
                b
            }
            None => env_logger::Builder::from_default_env(),
        };
        if builder.try_init().is_err() {
            log::debug!("Logger already initialized");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::save_file;
    use crate::data::seed::seed_filings;

    #[test]
    fn empty_config_uses_seed_data() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.data_source, DataSource::Seed);
        assert!(config.log_filter.is_none());
        assert_eq!(config.provider().list_all().unwrap().len(), 12);
    }

    #[test]
    fn file_source_round_trips_through_provider() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("filings.json");
        save_file(&data, &seed_filings()).unwrap();

        let config_path = dir.path().join("dashboard.json");
        let config = DashboardConfig {
            data_source: DataSource::File { path: data },
            log_filter: Some("debug".into()),
        };
        std::fs::write(&config_path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = DashboardConfig::load(&config_path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.provider().list_all().unwrap(), seed_filings());
        loaded.init_logging();
        loaded.init_logging();
    }

    #[test]
    fn unsupported_or_missing_files_fail_validation() {
        let bad_ext = DashboardConfig {
            data_source: DataSource::File {
                path: "filings.xlsx".into(),
            },
            log_filter: None,
        };
        assert!(matches!(bad_ext.validate(), Err(Error::Config(_))));

        let missing = DashboardConfig {
            data_source: DataSource::File {
                path: "/nonexistent/filings.csv".into(),
            },
            log_filter: None,
        };
        assert!(matches!(missing.validate(), Err(Error::Config(_))));
    }
}
