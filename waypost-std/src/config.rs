//! Configuration loading from TOML.
//!
//! ```toml
//! [router]
//! name = "site"
//! base_path = "public"
//! policy = "verified"
//!
//! [events]
//! snapshot_path = "cache/events.json"
//! ```
//!
//! Every key is optional.

use crate::routing::{DEFAULT_INDEX_FILE, MatchPolicy};
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid TOML or has the wrong shape.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Router settings.
    pub router: RouterConfig,
    /// Event bus settings.
    pub events: EventsConfig,
}

/// Router settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Label used in logs.
    pub name: String,
    /// Root of the static files.
    pub base_path: PathBuf,
    /// File served for directory requests.
    pub index_file: String,
    /// Directory the front controller runs from; defaults to `base_path`.
    pub script_dir: Option<PathBuf>,
    /// Dynamic route selection policy.
    pub policy: MatchPolicy,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            base_path: PathBuf::from("."),
            index_file: DEFAULT_INDEX_FILE.to_owned(),
            script_dir: None,
            policy: MatchPolicy::default(),
        }
    }
}

/// Event bus settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    /// Where the listener snapshot lives, if snapshots are used.
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let index = Path::new(&self.router.index_file);
        let mut components = index.components();
        let single_name = matches!(
            (components.next(), components.next()),
            (Some(std::path::Component::Normal(_)), None)
        );
        if !single_name {
            return Err(ConfigError::Invalid(format!(
                "router.index_file must be a plain file name, got `{}`",
                self.router.index_file
            )));
        }
        if self.router.base_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("router.base_path must not be empty".into()));
        }
        if matches!(&self.events.snapshot_path, Some(path) if path.as_os_str().is_empty()) {
            return Err(ConfigError::Invalid(
                "events.snapshot_path must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let config = Config::from_toml_str(&content)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(path = %path.display(), router = %config.router.name, "loaded config");

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.router.base_path, PathBuf::from("."));
        assert_eq!(config.router.index_file, "index.html");
        assert_eq!(config.router.policy, MatchPolicy::Legacy);
        assert!(config.events.snapshot_path.is_none());
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            [router]
            name = "site"
            base_path = "public"
            index_file = "home.html"
            script_dir = "public/app"
            policy = "verified"

            [events]
            snapshot_path = "cache/events.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.router.name, "site");
        assert_eq!(config.router.script_dir, Some(PathBuf::from("public/app")));
        assert_eq!(config.router.policy, MatchPolicy::Verified);
        assert_eq!(
            config.events.snapshot_path,
            Some(PathBuf::from("cache/events.json"))
        );
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = Config::from_toml_str("[router]\npolicy = \"fastest\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_rejects_index_file_with_directories() {
        let err = Config::from_toml_str("[router]\nindex_file = \"../secret\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("waypost.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
