//! Server error types.

use resource_api::ConfigurationError;
use thiserror::Error;

/// Errors that stop the IPAM API server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource registration failed
    #[error("Registration failed: {0}")]
    Registration(#[from] ConfigurationError),

    /// Listener or serve failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
