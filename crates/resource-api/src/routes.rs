//! HTTP binding for the generic controller
//!
//! Maps the five canonical operations onto `axum` routes and translates
//! [`ResourceError`]s into status codes. This is the only place where
//! errors become HTTP responses.

use crate::context::RequestContext;
use crate::controller::{ResourceController, ResourceResponse};
use crate::error::ResourceError;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Optional format suffix accepted on every path
pub const FORMAT_SUFFIX: &str = ".json";

type SharedController = Arc<ResourceController>;

/// Build the collection and member routes for one resource
pub fn resource_router(controller: ResourceController) -> Router {
    let collection = format!("/{}", controller.descriptor().derive_path());
    let member = format!("/{}", controller.descriptor().derive_member_path("{id}"));

    Router::new()
        .route(&collection, get(list).post(create))
        .route(&format!("{collection}{FORMAT_SUFFIX}"), get(list).post(create))
        .route(&member, get(show).put(update).delete(remove))
        .with_state(Arc::new(controller))
}

async fn create(State(controller): State<SharedController>, context: RequestContext, body: Bytes) -> Response {
    let result = controller.create(&context, &body).await;
    respond(&context, result)
}

async fn list(
    State(controller): State<SharedController>,
    context: RequestContext,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let result = controller.list(&context, &query).await;
    respond(&context, result)
}

async fn show(
    State(controller): State<SharedController>,
    context: RequestContext,
    Path(id): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    let result = controller.get(&context, strip_format(&id), &query).await;
    respond(&context, result)
}

async fn update(
    State(controller): State<SharedController>,
    context: RequestContext,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let result = controller.update(&context, strip_format(&id), &body).await;
    respond(&context, result)
}

async fn remove(
    State(controller): State<SharedController>,
    context: RequestContext,
    Path(id): Path<String>,
) -> Response {
    let result = controller.delete(&context, strip_format(&id)).await;
    respond(&context, result)
}

fn strip_format(id: &str) -> &str {
    id.strip_suffix(FORMAT_SUFFIX).unwrap_or(id)
}

fn respond(context: &RequestContext, result: Result<ResourceResponse, ResourceError>) -> Response {
    match result {
        Ok(response) => {
            debug!("[{}] RESPONDED {}", context.request_id, response.status);
            response.into_response()
        }
        Err(err @ ResourceError::Internal(_)) => {
            error!("[{}] FAILED: {}", context.request_id, err);
            err.into_response()
        }
        Err(err) => {
            warn!("[{}] FAILED: {}", context.request_id, err);
            err.into_response()
        }
    }
}

impl IntoResponse for ResourceResponse {
    fn into_response(self) -> Response {
        match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
}

impl IntoResponse for ResourceError {
    fn into_response(self) -> Response {
        // internal details stay in the logs
        let message = match &self {
            Self::Internal(_) => "Request failed: internal server error while processing your request".to_string(),
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message,
            },
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResourceDescriptor;
    use crate::mock::{MockResourcePlugin, PluginCall};
    use crate::schema::{AttributeSchema, AttributeSpec, AttributeType};
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn router(mock: &MockResourcePlugin) -> Router {
        let schema = AttributeSchema::new()
            .attribute("id", AttributeSpec::new(AttributeType::Uuid))
            .attribute("tenant_id", AttributeSpec::new(AttributeType::String).allow_post());
        let descriptor = Arc::new(ResourceDescriptor::new("ipam", schema));
        resource_router(ResourceController::new(descriptor, Arc::new(mock.clone())))
    }

    async fn send(router: Router, method: Method, uri: &str, body: Body) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().method(method).uri(uri).body(body).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_format_suffix_stripped() {
        let mock = MockResourcePlugin::new();
        let (status, _) = send(router(&mock), Method::GET, "/ipams/abc.json", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(matches!(mock.last_call(), Some(PluginCall::Get { ref id, .. }) if id == "abc"));

        let (status, _) = send(router(&mock), Method::GET, "/ipams.json", Body::empty()).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let mock = MockResourcePlugin::new();
        mock.set_get_response(Err(ResourceError::not_found("ipam", "abc")));

        let (status, body) = send(router(&mock), Method::GET, "/ipams/abc", Body::empty()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body["error"]["type"], "NotFoundError");
        assert_eq!(body["error"]["message"], "ipam abc could not be found");
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let mock = MockResourcePlugin::new();
        mock.set_delete_response(Err(ResourceError::Internal("db password leaked".into())));

        let (status, body) = send(router(&mock), Method::DELETE, "/ipams/abc", Body::empty()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!String::from_utf8_lossy(&body).contains("password"));
    }

    #[tokio::test]
    async fn test_delete_has_empty_body() {
        let mock = MockResourcePlugin::new();
        let (status, body) = send(router(&mock), Method::DELETE, "/ipams/abc", Body::empty()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_context_from_headers_reaches_plugin() {
        let mock = MockResourcePlugin::new();
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/ipams/abc")
            .header("x-tenant-id", "tenant-a")
            .header("x-request-id", "req-1")
            .body(Body::empty())
            .unwrap();
        router(&mock).oneshot(request).await.unwrap();

        match mock.last_call() {
            Some(PluginCall::Delete { context, id }) => {
                assert_eq!(id, "abc");
                assert_eq!(context.tenant_id.as_deref(), Some("tenant-a"));
                assert_eq!(context.request_id, "req-1");
            }
            other => panic!("unexpected call {other:?}"),
        }
    }
}
