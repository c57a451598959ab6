//! Recording plugin for unit testing
//!
//! `MockResourcePlugin` implements [`ResourcePlugin`] without any backend.
//! Every call is recorded for argument assertions, and each operation can be
//! primed with the result it should return.

use crate::context::RequestContext;
use crate::error::ResourceError;
use crate::plugin::{Fields, Filters, Resource, ResourcePlugin};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A call received by [`MockResourcePlugin`]
#[derive(Debug, Clone, PartialEq)]
pub enum PluginCall {
    /// `create`
    Create {
        /// Context passed through
        context: RequestContext,
        /// Singular-wrapped body
        body: Value,
    },
    /// `list`
    List {
        /// Context passed through
        context: RequestContext,
        /// Filters passed through
        filters: Filters,
        /// Fields passed through
        fields: Fields,
    },
    /// `get`
    Get {
        /// Context passed through
        context: RequestContext,
        /// Requested id
        id: String,
        /// Fields passed through
        fields: Fields,
    },
    /// `update`
    Update {
        /// Context passed through
        context: RequestContext,
        /// Target id
        id: String,
        /// Singular-wrapped body
        body: Value,
    },
    /// `delete`
    Delete {
        /// Context passed through
        context: RequestContext,
        /// Target id
        id: String,
    },
}

#[derive(Debug, Default)]
struct Responses {
    create: Option<Result<Resource, ResourceError>>,
    list: Option<Result<Vec<Resource>, ResourceError>>,
    get: Option<Result<Resource, ResourceError>>,
    update: Option<Result<Resource, ResourceError>>,
    delete: Option<Result<(), ResourceError>>,
}

/// Mock plugin for testing
///
/// Unprimed operations succeed: `create` echoes the body with an `id`,
/// `list` returns nothing, `get`/`update` return `{"id": <id>}`.
#[derive(Debug, Clone, Default)]
pub struct MockResourcePlugin {
    calls: Arc<Mutex<Vec<PluginCall>>>,
    responses: Arc<Mutex<Responses>>,
}

impl MockResourcePlugin {
    /// Create a new mock plugin
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls received so far, oldest first
    #[must_use]
    pub fn calls(&self) -> Vec<PluginCall> {
        lock(&self.calls).clone()
    }

    /// Most recent call
    #[must_use]
    pub fn last_call(&self) -> Option<PluginCall> {
        lock(&self.calls).last().cloned()
    }

    /// Result returned by every subsequent `create`
    pub fn set_create_response(&self, response: Result<Resource, ResourceError>) {
        lock(&self.responses).create = Some(response);
    }

    /// Result returned by every subsequent `list`
    pub fn set_list_response(&self, response: Result<Vec<Resource>, ResourceError>) {
        lock(&self.responses).list = Some(response);
    }

    /// Result returned by every subsequent `get`
    pub fn set_get_response(&self, response: Result<Resource, ResourceError>) {
        lock(&self.responses).get = Some(response);
    }

    /// Result returned by every subsequent `update`
    pub fn set_update_response(&self, response: Result<Resource, ResourceError>) {
        lock(&self.responses).update = Some(response);
    }

    /// Result returned by every subsequent `delete`
    pub fn set_delete_response(&self, response: Result<(), ResourceError>) {
        lock(&self.responses).delete = Some(response);
    }

    fn record(&self, call: PluginCall) {
        lock(&self.calls).push(call);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn id_only(id: &str) -> Resource {
    let mut resource = Resource::new();
    resource.insert("id".to_string(), json!(id));
    resource
}

#[async_trait::async_trait]
impl ResourcePlugin for MockResourcePlugin {
    async fn create(&self, context: &RequestContext, body: Value) -> Result<Resource, ResourceError> {
        self.record(PluginCall::Create {
            context: context.clone(),
            body: body.clone(),
        });
        if let Some(response) = lock(&self.responses).create.clone() {
            return response;
        }
        let mut created = body
            .as_object()
            .and_then(|outer| outer.values().next())
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        created.insert("id".to_string(), json!(uuid::Uuid::new_v4().to_string()));
        Ok(created)
    }

    async fn list(
        &self,
        context: &RequestContext,
        filters: &Filters,
        fields: &Fields,
    ) -> Result<Vec<Resource>, ResourceError> {
        self.record(PluginCall::List {
            context: context.clone(),
            filters: filters.clone(),
            fields: fields.clone(),
        });
        lock(&self.responses).list.clone().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn get(&self, context: &RequestContext, id: &str, fields: &Fields) -> Result<Resource, ResourceError> {
        self.record(PluginCall::Get {
            context: context.clone(),
            id: id.to_string(),
            fields: fields.clone(),
        });
        lock(&self.responses).get.clone().unwrap_or_else(|| Ok(id_only(id)))
    }

    async fn update(&self, context: &RequestContext, id: &str, body: Value) -> Result<Resource, ResourceError> {
        self.record(PluginCall::Update {
            context: context.clone(),
            id: id.to_string(),
            body,
        });
        lock(&self.responses).update.clone().unwrap_or_else(|| Ok(id_only(id)))
    }

    async fn delete(&self, context: &RequestContext, id: &str) -> Result<(), ResourceError> {
        self.record(PluginCall::Delete {
            context: context.clone(),
            id: id.to_string(),
        });
        lock(&self.responses).delete.clone().unwrap_or(Ok(()))
    }
}
