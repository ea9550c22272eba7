//! YAML configuration for the halal scanner.
//!
//! Every section is optional and falls back to its defaults, so an empty
//! document with only a `version` is a valid configuration.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "pantry scanner"
//!
//! history:
//!   backend: "redb"
//!   path: "/var/lib/halal-scan/history.redb"
//!   max_records: 100
//!
//! lookup:
//!   base_url: "https://world.openfoodfacts.org"
//!   timeout_secs: 30
//!   connect_timeout_secs: 10
//!
//! lexicon:
//!   extra_forbidden: ["lard", "pork fat"]
//!   extra_possibly_derived: ["whey"]
//!
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use history::{BackendConfig, DEFAULT_MAX_RECORDS};
use ingredients::{Lexicon, LexiconError};
use lookup::LookupConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the YAML file the binary loads.
pub const CONFIG_ENV_VAR: &str = "HALAL_SCAN_CONFIG";

/// History file used by [`HalalScanConfig::from_env`] when no config file is
/// named, relative to the working directory.
pub const DEFAULT_HISTORY_PATH: &str = "halal-scan-history.redb";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HalalScanConfig {
    /// Configuration format version
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub history: HistoryYamlConfig,

    #[serde(default)]
    pub lookup: LookupConfig,

    #[serde(default)]
    pub lexicon: LexiconYamlConfig,

    #[serde(default)]
    pub logging: LoggingYamlConfig,
}

impl HalalScanConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: HalalScanConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `HALAL_SCAN_CONFIG`, or [`Self::persistent`]
    /// when unset.
    pub fn from_env() -> Result<Self, ConfigLoadError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(path),
            None => Ok(Self::persistent()),
        }
    }

    /// Defaults, but with history kept in [`DEFAULT_HISTORY_PATH`] so it
    /// survives restarts. Falls back to in-memory history when the crate is
    /// built without the `redb` feature.
    pub fn persistent() -> Self {
        let mut config = Self::default();
        if cfg!(feature = "redb") {
            config.history.backend = "redb".to_string();
            config.history.path = Some(DEFAULT_HISTORY_PATH.to_string());
        }
        config
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.history.validate()?;
        validate_lookup(&self.lookup)?;
        self.lexicon.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

impl Default for HalalScanConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            history: HistoryYamlConfig::default(),
            lookup: LookupConfig::default(),
            lexicon: LexiconYamlConfig::default(),
            logging: LoggingYamlConfig::default(),
        }
    }
}

/// History store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryYamlConfig {
    /// `in_memory` or `redb`
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Database file, required for `redb`
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

impl HistoryYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.backend.as_str() {
            "in_memory" => {}
            "redb" => {
                if self.path.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigLoadError::Validation(
                        "history.path is required when backend is 'redb'".to_string(),
                    ));
                }
            }
            other => {
                return Err(ConfigLoadError::Validation(format!(
                    "history.backend must be 'in_memory' or 'redb', got '{other}'"
                )));
            }
        }
        if self.max_records == 0 {
            return Err(ConfigLoadError::Validation(
                "history.max_records must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Backend selection for [`history::HistoryStore::new`].
    pub fn backend_config(&self) -> BackendConfig {
        match (self.backend.as_str(), self.path.as_deref()) {
            ("redb", Some(path)) => BackendConfig::redb(path),
            _ => BackendConfig::in_memory(),
        }
    }
}

impl Default for HistoryYamlConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            path: None,
            max_records: default_max_records(),
        }
    }
}

fn validate_lookup(cfg: &LookupConfig) -> Result<(), ConfigLoadError> {
    if !(cfg.base_url.starts_with("http://") || cfg.base_url.starts_with("https://")) {
        return Err(ConfigLoadError::Validation(
            "lookup.base_url must start with http:// or https://".to_string(),
        ));
    }
    if cfg.timeout_secs == 0 {
        return Err(ConfigLoadError::Validation(
            "lookup.timeout_secs must be >= 1".to_string(),
        ));
    }
    if cfg.connect_timeout_secs == 0 {
        return Err(ConfigLoadError::Validation(
            "lookup.connect_timeout_secs must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Additional lexicon entries merged into the built-in lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LexiconYamlConfig {
    #[serde(default)]
    pub extra_forbidden: Vec<String>,

    #[serde(default)]
    pub extra_possibly_derived: Vec<String>,
}

impl LexiconYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.build()
            .map(|_| ())
            .map_err(|err| ConfigLoadError::Validation(format!("lexicon: {err}")))
    }

    /// The lexicon to classify with: the shared built-in one, or a copy
    /// extended with the extras when any are set.
    pub fn build(&self) -> Result<Arc<Lexicon>, LexiconError> {
        if self.extra_forbidden.is_empty() && self.extra_possibly_derived.is_empty() {
            return Ok(Lexicon::shared_builtin());
        }
        Lexicon::extended(&self.extra_forbidden, &self.extra_possibly_derived).map(Arc::new)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingYamlConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LoggingYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "logging.level must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingYamlConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_backend() -> String {
    "in_memory".to_string()
}
fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}
fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
history:
  backend: "redb"
  path: "/tmp/history.redb"
  max_records: 50
"#;

        let config = HalalScanConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.history.max_records, 50);
        assert_eq!(
            config.history.backend_config(),
            BackendConfig::redb("/tmp/history.redb")
        );
        assert_eq!(config.lookup, LookupConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
logging:
  level: "debug"
  json: true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = HalalScanConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn test_default_config() {
        let config = HalalScanConfig::default();
        assert_eq!(config.version, "1.0");
        assert!(config.name.is_none());
        assert_eq!(config.history.max_records, 100);
        assert_eq!(config.history.backend_config(), BackendConfig::InMemory);
        assert!(!config.logging.json);
        let lexicon = config.lexicon.build().unwrap();
        assert!(Arc::ptr_eq(&lexicon, &Lexicon::shared_builtin()));
    }

    #[cfg(feature = "redb")]
    #[test]
    fn test_persistent_config_uses_history_file() {
        let config = HalalScanConfig::persistent();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.history.backend_config(),
            BackendConfig::redb(DEFAULT_HISTORY_PATH)
        );
        assert_eq!(config.history.max_records, DEFAULT_MAX_RECORDS);
    }

    #[test]
    fn test_unsupported_version() {
        let result = HalalScanConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"
        ));
    }

    #[test]
    fn test_redb_requires_path() {
        let yaml = r#"
version: "1.0"
history:
  backend: "redb"
"#;
        let err = HalalScanConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("history.path is required"));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let yaml = r#"
version: "1.0"
history:
  backend: "sqlite"
"#;
        let err = HalalScanConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }

    #[test]
    fn test_zero_max_records_rejected() {
        let yaml = r#"
version: "1.0"
history:
  max_records: 0
"#;
        let err = HalalScanConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("max_records must be >= 1"));
    }

    #[test]
    fn test_lookup_validation() {
        let yaml = r#"
version: "1.0"
lookup:
  base_url: "ftp://catalog.example"
"#;
        let err = HalalScanConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("base_url"));

        let yaml = r#"
version: "1.0"
lookup:
  timeout_secs: 0
"#;
        let err = HalalScanConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_lexicon_extras() {
        let yaml = r#"
version: "1.0"
lexicon:
  extra_forbidden: ["Lard"]
  extra_possibly_derived: ["(Whey)"]
"#;
        let config = HalalScanConfig::from_yaml(yaml).unwrap();
        let lexicon = config.lexicon.build().unwrap();
        assert!(lexicon.is_forbidden("lard"));
        assert!(lexicon.is_possibly_derived("whey"));
        assert!(lexicon.is_forbidden("gelatin"));
    }

    #[test]
    fn test_lexicon_overlap_rejected() {
        let yaml = r#"
version: "1.0"
lexicon:
  extra_forbidden: ["lecithin"]
"#;
        let err = HalalScanConfig::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("lecithin"));
    }
}
