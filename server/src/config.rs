//! Configuration management for the server.

use std::env;

use whrow_engine::TransformerConfig;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Settings handed to the transformer
    pub transformer: TransformerConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let defaults = TransformerConfig::default();
        let flag = |key: &'static str, default: bool| match var(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidFlag(key)),
        };

        let max_columns_in_event = match var("WH_MAX_COLUMNS_IN_EVENT") {
            None => defaults.max_columns_in_event,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidColumnLimit)?,
        };

        Ok(Self {
            host,
            port,
            transformer: TransformerConfig {
                enable_id_resolution: flag(
                    "WH_ENABLE_ID_RESOLUTION",
                    defaults.enable_id_resolution,
                )?,
                populate_src_dest_info_in_context: flag(
                    "WH_POPULATE_SRC_DEST_INFO_IN_CONTEXT",
                    defaults.populate_src_dest_info_in_context,
                )?,
                max_columns_in_event,
            },
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("{0} must be true or false")]
    InvalidFlag(&'static str),

    #[error("Invalid WH_MAX_COLUMNS_IN_EVENT value")]
    InvalidColumnLimit,
}
