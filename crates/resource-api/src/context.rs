//! Per-request caller context
//!
//! The context is built from request headers by the routing layer and handed
//! to every plugin call unchanged. The controller never makes decisions based
//! on its contents.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::convert::Infallible;
use uuid::Uuid;

/// Header carrying the caller's user id
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the caller's tenant id
pub const TENANT_ID_HEADER: &str = "x-tenant-id";
/// Legacy alias for [`TENANT_ID_HEADER`]
pub const PROJECT_ID_HEADER: &str = "x-project-id";
/// Comma separated role list
pub const ROLES_HEADER: &str = "x-roles";
/// Caller supplied request id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Caller identity and authorization scope for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user, if any
    pub user_id: Option<String>,
    /// Tenant the caller acts for, if any
    pub tenant_id: Option<String>,
    /// Roles granted to the caller
    pub roles: Vec<String>,
    /// Correlation id for logs
    pub request_id: String,
}

impl RequestContext {
    /// Create a context with a freshly generated request id
    pub fn new(user_id: Option<String>, tenant_id: Option<String>, roles: Vec<String>) -> Self {
        Self {
            user_id,
            tenant_id,
            roles,
            request_id: generate_request_id(),
        }
    }

    /// Context carrying the `admin` role and no tenant
    #[must_use]
    pub fn admin() -> Self {
        Self::new(None, None, vec!["admin".to_string()])
    }

    /// Context scoped to a single tenant
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self::new(None, Some(tenant_id.into()), Vec::new())
    }

    /// Whether the caller holds the `admin` role
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case("admin"))
    }

    /// Build a context from request headers
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = header_value(headers, USER_ID_HEADER);
        let tenant_id =
            header_value(headers, TENANT_ID_HEADER).or_else(|| header_value(headers, PROJECT_ID_HEADER));
        let roles = header_value(headers, ROLES_HEADER)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        let request_id = header_value(headers, REQUEST_ID_HEADER).unwrap_or_else(generate_request_id);

        Self {
            user_id,
            tenant_id,
            roles,
            request_id,
        }
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn generate_request_id() -> String {
    format!("req-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_ID_HEADER, HeaderValue::from_static("alice"));
        headers.insert(TENANT_ID_HEADER, HeaderValue::from_static("tenant-a"));
        headers.insert(ROLES_HEADER, HeaderValue::from_static("member, admin ,"));
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-fixed"));

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.user_id.as_deref(), Some("alice"));
        assert_eq!(ctx.tenant_id.as_deref(), Some("tenant-a"));
        assert_eq!(ctx.roles, vec!["member".to_string(), "admin".to_string()]);
        assert_eq!(ctx.request_id, "req-fixed");
        assert!(ctx.is_admin());
    }

    #[test]
    fn test_project_header_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(PROJECT_ID_HEADER, HeaderValue::from_static("project-b"));

        let ctx = RequestContext::from_headers(&headers);
        assert_eq!(ctx.tenant_id.as_deref(), Some("project-b"));
        assert!(!ctx.is_admin());
        assert!(ctx.request_id.starts_with("req-"));
    }
}
