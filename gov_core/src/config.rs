use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_GOVERNOR_CONFIG: &str = include_str!("data/governor_config.json");

/// Tunables for the governor engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GovernorConfig {
    always_apply_at_server: bool,
}

impl GovernorConfig {
    pub fn builtin() -> Self {
        serde_json::from_str(BUILTIN_GOVERNOR_CONFIG)
            .expect("builtin governor config should parse")
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, GovernorConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|source| GovernorConfigError::ReadFailed {
                path: path.to_path_buf(),
                source,
            })?;
        let config = GovernorConfig::from_json_str(&contents)?;
        Ok(config)
    }

    /// Skip the "actual already equals target" short-circuit and always
    /// send something, if only a refresh. Debug aid.
    pub fn always_apply_at_server(&self) -> bool {
        self.always_apply_at_server
    }
}

#[derive(Debug, Error)]
pub enum GovernorConfigError {
    #[error("failed to parse governor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read governor config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Load the governor config from `GOVERNOR_CONFIG_PATH`, falling back to
/// the builtin defaults.
pub fn load_governor_config_from_env() -> GovernorConfig {
    if let Some(path) = env::var("GOVERNOR_CONFIG_PATH").ok().map(PathBuf::from) {
        match GovernorConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "gov::config",
                    path = %path.display(),
                    "governor_config.loaded=file"
                );
                return config;
            }
            Err(err) => {
                tracing::warn!(
                    target: "gov::config",
                    path = %path.display(),
                    error = %err,
                    "governor_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "gov::config", "governor_config.loaded=builtin");
    GovernorConfig::builtin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_parses_with_defaults() {
        let config = GovernorConfig::builtin();
        assert!(!config.always_apply_at_server());
    }

    #[test]
    fn json_override_is_honored() {
        let config = GovernorConfig::from_json_str(r#"{"always_apply_at_server": true}"#)
            .expect("valid json");
        assert!(config.always_apply_at_server());
    }

    #[test]
    fn unknown_fields_use_defaults() {
        let config = GovernorConfig::from_json_str("{}").expect("valid json");
        assert!(!config.always_apply_at_server());
    }
}
