//! Core configuration and explicit initialization phase.
//!
//! # Invariants
//! - `init_core` must complete before the first decode that uses the
//!   process-wide registry.
//! - Repeating `init_core` with the same config is a no-op.

use crate::factory::registry::{global_registry, registry_installed};
use crate::logging::{default_log_level, init_logging, LoggingError};
use log::info;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid core config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Logging(#[from] LoggingError),
}

/// Host-supplied core settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling logs; logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Starts logging (when configured) and freezes the process-wide registry.
///
/// A registry installed by the host beforehand is kept; otherwise the
/// standard registry is frozen.
pub fn init_core(config: &CoreConfig) -> Result<(), ConfigError> {
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }
    let host_registry = registry_installed();
    let _ = global_registry();
    info!(
        "event=core_init module=config status=ok logging={} host_registry={}",
        config.log_dir.is_some(),
        host_registry
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::logging::default_log_level;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.log_level, default_log_level());
    }

    #[test]
    fn reads_camel_case_fields() {
        let config =
            CoreConfig::from_json_str(r#"{ "logLevel": "warn", "logDir": "/var/log/study" }"#)
                .expect("config");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/study")));
    }

    #[test]
    fn rejects_malformed_document() {
        let err = CoreConfig::from_json_str(r#"{ "logLevel": 3 }"#).expect_err("bad type");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
