//! Server configuration loaded from environment variables.

use crate::error::ServerError;
use std::env;
use std::net::SocketAddr;

/// Listen address when `IPAM_API_BIND_ADDRESS` is unset
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9696";

/// API version prefix when `IPAM_API_PATH_PREFIX` is unset
pub const DEFAULT_PATH_PREFIX: &str = "/v2.0";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Socket the HTTP server listens on
    pub bind_address: SocketAddr,
    /// Prefix all resource routes are nested under; `None` serves them at the root
    pub path_prefix: Option<String>,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_values(
            env::var("IPAM_API_BIND_ADDRESS").ok().as_deref(),
            env::var("IPAM_API_PATH_PREFIX").ok().as_deref(),
        )
    }

    fn from_values(bind_address: Option<&str>, path_prefix: Option<&str>) -> Result<Self, ServerError> {
        let raw_bind = bind_address.unwrap_or(DEFAULT_BIND_ADDRESS);
        let bind_address = raw_bind.parse().map_err(|e| {
            ServerError::InvalidConfig(format!("IPAM_API_BIND_ADDRESS '{}' is not a socket address: {}", raw_bind, e))
        })?;

        let path_prefix = match path_prefix.unwrap_or(DEFAULT_PATH_PREFIX).trim_end_matches('/') {
            "" => None,
            prefix if prefix.starts_with('/') => Some(prefix.to_string()),
            prefix => {
                return Err(ServerError::InvalidConfig(format!(
                    "IPAM_API_PATH_PREFIX '{}' must start with '/'",
                    prefix
                )));
            }
        };

        Ok(Self {
            bind_address,
            path_prefix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_values(None, None).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:9696".parse().unwrap());
        assert_eq!(config.path_prefix.as_deref(), Some("/v2.0"));
    }

    #[test]
    fn test_empty_prefix_disables_nesting() {
        let config = Config::from_values(Some("127.0.0.1:8080"), Some("")).unwrap();
        assert_eq!(config.path_prefix, None);
        assert_eq!(config.bind_address.port(), 8080);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = Config::from_values(None, Some("/api/")).unwrap();
        assert_eq!(config.path_prefix.as_deref(), Some("/api"));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_values(Some("not-an-address"), None),
            Err(ServerError::InvalidConfig(_))
        ));
        assert!(matches!(
            Config::from_values(None, Some("v2.0")),
            Err(ServerError::InvalidConfig(_))
        ));
    }
}
