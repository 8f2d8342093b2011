//! Runtime configuration, loaded from TOML.
//!
//! ```toml
//! [query]
//! default_limit = 500
//! max_limit = 100000
//!
//! [fetch]
//! parallel = true
//! ```

use crate::{DEFAULT_LIMIT, MAX_LIMIT};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

///
/// ScaConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaConfig {
    pub query: QueryConfig,
    pub fetch: FetchConfig,
}

impl ScaConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let QueryConfig {
            default_limit,
            max_limit,
        } = self.query;

        if default_limit == 0 {
            return Err(ConfigError::Invalid(
                "query.default_limit must be at least 1".to_string(),
            ));
        }
        if default_limit > max_limit {
            return Err(ConfigError::Invalid(format!(
                "query.default_limit ({default_limit}) exceeds query.max_limit ({max_limit})"
            )));
        }

        Ok(())
    }
}

///
/// QueryConfig
///
/// Pagination bounds applied when compiling caller queries.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

///
/// FetchConfig
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// Run the detail and relational fetches on scoped threads.
    pub parallel: bool,
}
