//! Plugin interface
//!
//! The capability set a backend implements for one resource type. The
//! dispatch layer calls these methods and never implements domain logic
//! itself. Resource crates usually expose a named trait (`create_ipam`,
//! `get_ipams`, ...) and adapt it to [`ResourcePlugin`].

use crate::context::RequestContext;
use crate::error::ResourceError;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Wire representation of a resource instance
pub type Resource = Map<String, Value>;

/// Attribute name to accepted values (OR within a field, AND across fields)
pub type Filters = BTreeMap<String, BTreeSet<String>>;

/// Attributes to project into the response; empty means all
pub type Fields = BTreeSet<String>;

/// Backend for one resource type
///
/// One instance is shared by every request for the resource, so
/// implementations must be safe for concurrent use.
#[async_trait::async_trait]
pub trait ResourcePlugin: Send + Sync {
    /// Create a resource from the singular-wrapped, validated body
    async fn create(&self, context: &RequestContext, body: Value) -> Result<Resource, ResourceError>;

    /// List resources matching `filters`, projected to `fields`
    async fn list(
        &self,
        context: &RequestContext,
        filters: &Filters,
        fields: &Fields,
    ) -> Result<Vec<Resource>, ResourceError>;

    /// Fetch one resource, projected to `fields`
    async fn get(&self, context: &RequestContext, id: &str, fields: &Fields) -> Result<Resource, ResourceError>;

    /// Update a resource from the singular-wrapped, validated body
    async fn update(&self, context: &RequestContext, id: &str, body: Value) -> Result<Resource, ResourceError>;

    /// Delete a resource
    async fn delete(&self, context: &RequestContext, id: &str) -> Result<(), ResourceError>;
}
