//! Client configuration from the environment.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::default_store_path;

pub const API_URL_VAR: &str = "ENTBRIDGE_API_URL";
pub const STORE_PATH_VAR: &str = "ENTBRIDGE_STORE_PATH";
pub const DEFAULT_API_URL: &str = "http://localhost:9380";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid URL ({value:?}): {source}")]
    InvalidUrl {
        var: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no store path configured and none could be derived: {0}")]
    StorePath(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the enterprise API, without a trailing `/`.
    pub api_url: String,
    pub store_path: PathBuf,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());

        let api_url = get(API_URL_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string());
        url::Url::parse(&api_url).map_err(|source| ConfigError::InvalidUrl {
            var: API_URL_VAR,
            value: api_url.clone(),
            source,
        })?;

        let store_path = match get(STORE_PATH_VAR) {
            Some(path) => PathBuf::from(path),
            None => default_store_path().map_err(|e| ConfigError::StorePath(e.to_string()))?,
        };

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            store_path,
        })
    }
}
