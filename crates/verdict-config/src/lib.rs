use std::env;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Error
// ─────────────────────────────────────────────────────────────────────────────

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

// ─────────────────────────────────────────────────────────────────────────────
// Keys & Defaults
// ─────────────────────────────────────────────────────────────────────────────

pub const HOST_VAR: &str = "VERDICT_HOST";
pub const PORT_VAR: &str = "VERDICT_PORT";
pub const MODEL_PATH_VAR: &str = "VERDICT_MODEL_PATH";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MODEL_PATH: &str = "models/rf_model.json";

// ─────────────────────────────────────────────────────────────────────────────
// Server Config
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

impl ServerConfig {
    /// Reads the config from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the config through `lookup`, falling back to defaults for
    /// unset keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_VAR) {
            let host = host.trim();
            if host.is_empty() {
                return Err(ConfigError::Empty(HOST_VAR));
            }
            config.host = host.to_string();
        }

        if let Some(port) = lookup(PORT_VAR) {
            config.port = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: PORT_VAR,
                value: port.clone(),
            })?;
        }

        if let Some(path) = lookup(MODEL_PATH_VAR) {
            if path.trim().is_empty() {
                return Err(ConfigError::Empty(MODEL_PATH_VAR));
            }
            config.model_path = PathBuf::from(path);
        }

        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
