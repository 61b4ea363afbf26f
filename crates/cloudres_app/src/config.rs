use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cloudres_core::SelectionPolicy;
use cloudres_engine::{ServiceSettings, SettingsError, DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL};
use cloudres_logging::{cloudres_debug, cloudres_info};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILENAME: &str = "cloudres.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("poll interval must be at least one second")]
    ZeroPollInterval,
    #[error(transparent)]
    Service(#[from] SettingsError),
}

/// Settings read from `cloudres.ron`. Any field may be omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_secs: u64,
    pub selection: SelectionPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            selection: SelectionPolicy::default(),
        }
    }
}

impl AppConfig {
    /// Reads `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                cloudres_debug!("No config at {:?}; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cloudres_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    pub fn service_settings(&self) -> Result<ServiceSettings, ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(ServiceSettings::new(&self.base_url)?
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join(DEFAULT_CONFIG_FILENAME)).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval_secs, 10);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                base_url: "http://analysis.local:9000/api",
                selection: (max_file_bytes: 2048),
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.base_url, "http://analysis.local:9000/api");
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.selection.max_file_bytes, 2048);
        assert_eq!(config.selection.accepted_suffixes, vec![".fastq.gz".to_string()]);

        let settings = config.service_settings().unwrap();
        assert_eq!(settings.base_url().as_str(), "http://analysis.local:9000/api/");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILENAME);
        fs::write(&path, "(base_url: 42").unwrap();

        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
    }

    #[test]
    fn zero_interval_and_bad_url_are_rejected() {
        let config = AppConfig {
            poll_interval_secs: 0,
            ..AppConfig::default()
        };
        assert!(matches!(
            config.service_settings(),
            Err(ConfigError::ZeroPollInterval)
        ));

        let config = AppConfig {
            base_url: "ftp://example.com/".to_string(),
            ..AppConfig::default()
        };
        assert!(matches!(
            config.service_settings(),
            Err(ConfigError::Service(_))
        ));
    }
}
