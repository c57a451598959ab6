//! Generic CRUD controller
//!
//! One controller serves any resource type: it validates the request against
//! the descriptor's schema, calls the matching plugin method and wraps the
//! result under the singular or plural resource key. It keeps no state
//! between requests.
//!
//! Each request moves RECEIVED → VALIDATED → DISPATCHED → RESPONDED, or ends
//! in FAILED when validation or the plugin reports an error.

use crate::context::RequestContext;
use crate::descriptor::ResourceDescriptor;
use crate::error::ResourceError;
use crate::plugin::{Resource, ResourcePlugin};
use crate::query::ListQuery;
use crate::schema::Operation;
use axum::http::StatusCode;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Framework-independent outcome of a successful request
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceResponse {
    /// Status code to send
    pub status: StatusCode,
    /// JSON body; `None` means an empty body
    pub body: Option<Value>,
}

impl ResourceResponse {
    fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
        }
    }

    fn no_content() -> Self {
        Self {
            status: StatusCode::NO_CONTENT,
            body: None,
        }
    }
}

/// Dispatches CRUD requests for one resource to its plugin
#[derive(Clone)]
pub struct ResourceController {
    descriptor: Arc<ResourceDescriptor>,
    plugin: Arc<dyn ResourcePlugin>,
}

impl std::fmt::Debug for ResourceController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceController")
            .field("resource", &self.descriptor.singular())
            .finish_non_exhaustive()
    }
}

impl ResourceController {
    /// Bind a descriptor to a plugin instance
    pub fn new(descriptor: Arc<ResourceDescriptor>, plugin: Arc<dyn ResourcePlugin>) -> Self {
        Self { descriptor, plugin }
    }

    /// Descriptor this controller serves
    #[must_use]
    pub fn descriptor(&self) -> &ResourceDescriptor {
        &self.descriptor
    }

    /// `POST /<plural>`
    ///
    /// # Errors
    ///
    /// Validation failures, or whatever the plugin reports.
    pub async fn create(&self, context: &RequestContext, raw_body: &[u8]) -> Result<ResourceResponse, ResourceError> {
        self.received(context, "create", None);
        let attributes = self.unwrap_body(raw_body)?;
        let validated = self.descriptor.schema().validate(&attributes, Operation::Create)?;
        self.validated(context, "create");

        let created = self.plugin.create(context, self.wrap(validated)).await?;
        self.dispatched(context, "create");

        Ok(ResourceResponse::json(StatusCode::CREATED, self.single(created)))
    }

    /// `GET /<plural>`
    ///
    /// # Errors
    ///
    /// Malformed filters, or whatever the plugin reports.
    pub async fn list(
        &self,
        context: &RequestContext,
        query: &[(String, String)],
    ) -> Result<ResourceResponse, ResourceError> {
        self.received(context, "list", None);
        let ListQuery { filters, fields } = ListQuery::parse(query, self.descriptor.schema())?;
        self.validated(context, "list");

        let resources = self.plugin.list(context, &filters, &fields).await?;
        self.dispatched(context, "list");

        let items = resources
            .into_iter()
            .map(|resource| Value::Object(self.visible(resource)))
            .collect();
        let mut body = Map::new();
        body.insert(self.descriptor.plural().to_string(), Value::Array(items));
        Ok(ResourceResponse::json(StatusCode::OK, Value::Object(body)))
    }

    /// `GET /<plural>/<id>`
    ///
    /// # Errors
    ///
    /// Missing id, or whatever the plugin reports.
    pub async fn get(
        &self,
        context: &RequestContext,
        id: &str,
        query: &[(String, String)],
    ) -> Result<ResourceResponse, ResourceError> {
        self.received(context, "get", Some(id));
        let id = require_id(id)?;
        let fields = ListQuery::parse_fields(query);
        self.validated(context, "get");

        let resource = self.plugin.get(context, id, &fields).await?;
        self.dispatched(context, "get");

        Ok(ResourceResponse::json(StatusCode::OK, self.single(resource)))
    }

    /// `PUT /<plural>/<id>`
    ///
    /// # Errors
    ///
    /// Validation failures, or whatever the plugin reports.
    pub async fn update(
        &self,
        context: &RequestContext,
        id: &str,
        raw_body: &[u8],
    ) -> Result<ResourceResponse, ResourceError> {
        self.received(context, "update", Some(id));
        let id = require_id(id)?;
        let attributes = self.unwrap_body(raw_body)?;
        let validated = self.descriptor.schema().validate(&attributes, Operation::Update)?;
        self.validated(context, "update");

        let updated = self.plugin.update(context, id, self.wrap(validated)).await?;
        self.dispatched(context, "update");

        Ok(ResourceResponse::json(StatusCode::OK, self.single(updated)))
    }

    /// `DELETE /<plural>/<id>`
    ///
    /// # Errors
    ///
    /// Missing id, or whatever the plugin reports.
    pub async fn delete(&self, context: &RequestContext, id: &str) -> Result<ResourceResponse, ResourceError> {
        self.received(context, "delete", Some(id));
        let id = require_id(id)?;
        self.validated(context, "delete");

        self.plugin.delete(context, id).await?;
        self.dispatched(context, "delete");

        Ok(ResourceResponse::no_content())
    }

    /// Parse a request body and return the attributes under the singular key
    fn unwrap_body(&self, raw_body: &[u8]) -> Result<Map<String, Value>, ResourceError> {
        let singular = self.descriptor.singular();
        let body: Value = serde_json::from_slice(raw_body)
            .map_err(|e| ResourceError::Validation(format!("Malformed request body: {e}")))?;

        let Value::Object(mut outer) = body else {
            return Err(ResourceError::Validation("Request body must be a JSON object".to_string()));
        };
        let inner = outer
            .remove(singular)
            .ok_or_else(|| ResourceError::Validation(format!("Unable to find '{singular}' in request body")))?;
        if let Some(extra) = outer.keys().next() {
            return Err(ResourceError::Validation(format!(
                "Unexpected top-level key '{extra}' in request body"
            )));
        }

        match inner {
            Value::Object(attributes) => Ok(attributes),
            _ => Err(ResourceError::Validation(format!("'{singular}' must be a JSON object"))),
        }
    }

    fn wrap(&self, attributes: Map<String, Value>) -> Value {
        let mut body = Map::new();
        body.insert(self.descriptor.singular().to_string(), Value::Object(attributes));
        Value::Object(body)
    }

    fn single(&self, resource: Resource) -> Value {
        self.wrap(self.visible(resource))
    }

    fn visible(&self, mut resource: Resource) -> Resource {
        self.descriptor.schema().strip_internal(&mut resource);
        resource
    }

    fn received(&self, context: &RequestContext, operation: &str, id: Option<&str>) {
        debug!(
            "[{}] RECEIVED {} {} {}",
            context.request_id,
            operation,
            self.descriptor.singular(),
            id.unwrap_or("-")
        );
    }

    fn validated(&self, context: &RequestContext, operation: &str) {
        debug!("[{}] VALIDATED {} {}", context.request_id, operation, self.descriptor.singular());
    }

    fn dispatched(&self, context: &RequestContext, operation: &str) {
        debug!("[{}] DISPATCHED {} {}", context.request_id, operation, self.descriptor.singular());
    }
}

/// Reject a blank id; the id itself is forwarded untouched
fn require_id(id: &str) -> Result<&str, ResourceError> {
    if id.trim().is_empty() {
        Err(ResourceError::Validation("Resource id is required".to_string()))
    } else {
        Ok(id)
    }
}
