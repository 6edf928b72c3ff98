//! Client configuration.
//!
//! Values come from an optional RON file, then `CHEATSHEET_*` environment
//! variables, then command-line flags, each layer overriding the previous.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cheatsheet_core::DEFAULT_DOC_TYPE;
use cheatsheet_engine::BackendSettings;
use cheatsheet_logging::sheet_info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "cheatsheet.ron";
pub const ENV_API_URL: &str = "CHEATSHEET_API_URL";
pub const ENV_OUTPUT_DIR: &str = "CHEATSHEET_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub doc_type: String,
    pub output_dir: PathBuf,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
    pub max_download_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let backend = BackendSettings::default();
        Self {
            api_base_url: backend.base_url,
            doc_type: DEFAULT_DOC_TYPE.to_string(),
            output_dir: PathBuf::from("output"),
            connect_timeout_secs: backend.connect_timeout.as_secs(),
            request_timeout_secs: backend.request_timeout.map(|timeout| timeout.as_secs()),
            max_download_bytes: backend.max_download_bytes,
        }
    }
}

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub output_dir: Option<PathBuf>,
}

impl ClientConfig {
    /// Reads `explicit` if given, otherwise `./cheatsheet.ron` when present,
    /// otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        sheet_info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Applies environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url;
        }
        if let Some(dir) = lookup(ENV_OUTPUT_DIR).filter(|v| !v.trim().is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn apply_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.api_base_url {
            self.api_base_url = url;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        self
    }

    pub fn backend_settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.api_base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            max_download_bytes: self.max_download_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::path::PathBuf;
    use std::time::Duration;

    use tempfile::TempDir;

    use super::{ClientConfig, ConfigError, Overrides, ENV_API_URL, ENV_OUTPUT_DIR};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_local_service() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.doc_type, "cheatsheet");
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.backend_settings().connect_timeout, Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("cheatsheet.ron");
        fs::write(
            &path,
            r#"(api_base_url: "http://sheets.internal:9000", request_timeout_secs: Some(600))"#,
        )
        .unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.api_base_url, "http://sheets.internal:9000");
        assert_eq!(config.request_timeout_secs, Some(600));
        assert_eq!(config.doc_type, "cheatsheet");
        assert_eq!(
            config.backend_settings().request_timeout,
            Some(Duration::from_secs(600))
        );
    }

    #[test]
    fn file_then_env_then_flags() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("c.ron");
        fs::write(&path, r#"(api_base_url: "http://file:1", output_dir: "from-file")"#).unwrap();

        let config = ClientConfig::load(Some(&path))
            .unwrap()
            .apply_env(env(&[(ENV_API_URL, "http://env:2")]));
        assert_eq!(config.api_base_url, "http://env:2");
        assert_eq!(config.output_dir, PathBuf::from("from-file"));

        let config = config
            .apply_env(env(&[(ENV_OUTPUT_DIR, "from-env")]))
            .apply_overrides(Overrides {
                api_base_url: Some("http://flag:3".to_string()),
                output_dir: None,
            });
        assert_eq!(config.api_base_url, "http://flag:3");
        assert_eq!(config.output_dir, PathBuf::from("from-env"));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let config = ClientConfig::default().apply_env(env(&[(ENV_API_URL, "  ")]));
        assert_eq!(config.api_base_url, "http://localhost:8000");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = ClientConfig::load(Some(&temp.path().join("absent.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.ron");
        fs::write(&path, "(api_base_url: ").unwrap();
        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
