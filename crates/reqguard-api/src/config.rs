//! # Configuration
//!
//! Server settings read from the environment.
//!
//! | variable | default |
//! |---|---|
//! | `PORT` | `8080` |
//! | `API_DESCRIPTION` | none (required by the binary) |
//! | `MALFORMED_BODY` | `reject` |
//! | `BODY_LIMIT_BYTES` | 2 MiB |
//!
//! `RUST_LOG` is read by the tracing subscriber in `main`, not here.

use std::path::PathBuf;

use reqguard_schema::MalformedBodyPolicy;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    pub api_description: Option<PathBuf>,
    pub malformed_body: MalformedBodyPolicy,
    pub body_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_description: None,
            malformed_body: MalformedBodyPolicy::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
            api_description: lookup("API_DESCRIPTION")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            malformed_body: parse_var(&lookup, "MALFORMED_BODY")?
                .unwrap_or(defaults.malformed_body),
            body_limit: parse_var(&lookup, "BODY_LIMIT_BYTES")?.unwrap_or(defaults.body_limit),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            value: raw,
            reason: e.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: String,
        value: String,
        reason: String,
    },
    #[error("API_DESCRIPTION environment variable is required")]
    MissingDescription,
}
