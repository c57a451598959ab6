//! Resource API errors
//!
//! Per-request failures are [`ResourceError`]s and are translated to HTTP
//! status codes at a single boundary (see `routes`). Startup failures are
//! [`ConfigurationError`]s and never reach a request.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while handling a single request
///
/// Plugins report domain failures with the same type, so the controller
/// never has to reinterpret a backend error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceError {
    /// Bad, unknown or missing field, or a malformed request body/query
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The addressed resource does not exist
    #[error("{resource} {id} could not be found")]
    NotFound {
        /// Singular resource name
        resource: String,
        /// Requested identity
        id: String,
    },

    /// Duplicate or contended state in the backend
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other backend failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResourceError {
    /// Shorthand for a [`ResourceError::NotFound`]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// HTTP status code this error maps to
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error kind reported in the response body
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::NotFound { .. } => "NotFoundError",
            Self::Conflict(_) => "ConflictError",
            Self::Internal(_) => "InternalError",
        }
    }
}

/// Errors detected while registering resources at startup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// Another resource already owns this collection name
    #[error("Resource collection '{0}' is already registered")]
    DuplicateResource(String),

    /// Registration attempted after the routing table was built
    #[error("Cannot register '{0}': routing table is frozen")]
    RegistryFrozen(String),

    /// Attribute schema is unusable
    #[error("Invalid schema for '{resource}': {reason}")]
    InvalidSchema {
        /// Resource being registered
        resource: String,
        /// What is wrong with it
        reason: String,
    },

    /// Singular or plural name is not a valid path segment
    #[error("Invalid resource name '{0}'")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ResourceError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ResourceError::not_found("ipam", "1").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ResourceError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ResourceError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_message() {
        let err = ResourceError::not_found("ipam", "abc");
        assert_eq!(err.to_string(), "ipam abc could not be found");
    }
}
