//! IPAM plugin contract
//!
//! Backends implement [`IpamPlugin`]; [`IpamResource`] adapts it to the
//! generic [`ResourcePlugin`] table so the shared controller can dispatch to
//! it.

use resource_api::{Fields, Filters, RequestContext, Resource, ResourceError, ResourcePlugin};
use serde_json::Value;
use std::sync::Arc;

/// Backend operations for the `ipam` resource
///
/// `ipam` bodies arrive wrapped under the `ipam` key, already validated
/// against the attribute map. Implementations are shared across concurrent
/// requests and own all consistency control.
#[async_trait::async_trait]
pub trait IpamPlugin: Send + Sync {
    async fn create_ipam(&self, context: &RequestContext, ipam: Value) -> Result<Resource, ResourceError>;
    async fn get_ipams(
        &self,
        context: &RequestContext,
        filters: &Filters,
        fields: &Fields,
    ) -> Result<Vec<Resource>, ResourceError>;
    async fn get_ipam(&self, context: &RequestContext, id: &str, fields: &Fields) -> Result<Resource, ResourceError>;
    async fn update_ipam(&self, context: &RequestContext, id: &str, ipam: Value) -> Result<Resource, ResourceError>;
    async fn delete_ipam(&self, context: &RequestContext, id: &str) -> Result<(), ResourceError>;
}

/// Binds an [`IpamPlugin`] to the generic dispatch layer
pub struct IpamResource<P> {
    plugin: Arc<P>,
}

impl<P> IpamResource<P> {
    /// Wrap a shared plugin instance
    pub fn new(plugin: Arc<P>) -> Self {
        Self { plugin }
    }
}

impl<P> std::fmt::Debug for IpamResource<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpamResource").finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
impl<P: IpamPlugin> ResourcePlugin for IpamResource<P> {
    async fn create(&self, context: &RequestContext, body: Value) -> Result<Resource, ResourceError> {
        self.plugin.create_ipam(context, body).await
    }

    async fn list(
        &self,
        context: &RequestContext,
        filters: &Filters,
        fields: &Fields,
    ) -> Result<Vec<Resource>, ResourceError> {
        self.plugin.get_ipams(context, filters, fields).await
    }

    async fn get(&self, context: &RequestContext, id: &str, fields: &Fields) -> Result<Resource, ResourceError> {
        self.plugin.get_ipam(context, id, fields).await
    }

    async fn update(&self, context: &RequestContext, id: &str, body: Value) -> Result<Resource, ResourceError> {
        self.plugin.update_ipam(context, id, body).await
    }

    async fn delete(&self, context: &RequestContext, id: &str) -> Result<(), ResourceError> {
        self.plugin.delete_ipam(context, id).await
    }
}
