//! In-memory IPAM backend
//!
//! Keeps ipams in a process-local map. It carries no address allocation
//! logic; it exists so the API can be served and exercised without an
//! external IPAM system.

use crate::attributes::RESOURCE_NAME;
use crate::plugin::IpamPlugin;
use resource_api::{Fields, Filters, RequestContext, Resource, ResourceError};
use serde_json::{Value, json};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// IPAM plugin storing ipams in memory
///
/// Non-admin callers with a tenant only see their own tenant's ipams.
#[derive(Debug, Default)]
pub struct InMemoryIpamPlugin {
    ipams: RwLock<BTreeMap<String, Resource>>,
}

impl InMemoryIpamPlugin {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored ipams, across all tenants
    pub async fn len(&self) -> usize {
        self.ipams.read().await.len()
    }

    /// Whether the store is empty
    pub async fn is_empty(&self) -> bool {
        self.ipams.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl IpamPlugin for InMemoryIpamPlugin {
    async fn create_ipam(&self, context: &RequestContext, ipam: Value) -> Result<Resource, ResourceError> {
        let mut attributes = unwrap_ipam(ipam)?;
        let tenant_id = string_attr(&attributes, "tenant_id").unwrap_or_default();
        let name = string_attr(&attributes, "name").unwrap_or_default();

        if let Some(scope) = tenant_scope(context) {
            if scope != tenant_id {
                return Err(ResourceError::Validation(format!(
                    "Cannot create {RESOURCE_NAME} for tenant '{tenant_id}'"
                )));
            }
        }

        let mut ipams = self.ipams.write().await;
        if !name.is_empty()
            && ipams.values().any(|existing| {
                string_attr(existing, "tenant_id").as_deref() == Some(tenant_id.as_str())
                    && string_attr(existing, "name").as_deref() == Some(name.as_str())
            })
        {
            return Err(ResourceError::Conflict(format!(
                "{RESOURCE_NAME} '{name}' already exists for tenant '{tenant_id}'"
            )));
        }

        let id = Uuid::new_v4().to_string();
        attributes.insert("id".to_string(), json!(id));
        attributes.insert("fq_name".to_string(), json!([tenant_id, name]));
        attributes.insert("nets_using".to_string(), json!([]));
        ipams.insert(id.clone(), attributes.clone());

        debug!("Created {} {} for tenant {}", RESOURCE_NAME, id, tenant_id);
        Ok(attributes)
    }

    async fn get_ipams(
        &self,
        context: &RequestContext,
        filters: &Filters,
        fields: &Fields,
    ) -> Result<Vec<Resource>, ResourceError> {
        let ipams = self.ipams.read().await;
        Ok(ipams
            .values()
            .filter(|ipam| visible_to(context, ipam))
            .filter(|ipam| matches_filters(ipam, filters))
            .map(|ipam| project(ipam, fields))
            .collect())
    }

    async fn get_ipam(&self, context: &RequestContext, id: &str, fields: &Fields) -> Result<Resource, ResourceError> {
        let ipams = self.ipams.read().await;
        ipams
            .get(id)
            .filter(|ipam| visible_to(context, ipam))
            .map(|ipam| project(ipam, fields))
            .ok_or_else(|| ResourceError::not_found(RESOURCE_NAME, id))
    }

    async fn update_ipam(&self, context: &RequestContext, id: &str, ipam: Value) -> Result<Resource, ResourceError> {
        let changes = unwrap_ipam(ipam)?;
        let mut ipams = self.ipams.write().await;
        let existing = ipams
            .get_mut(id)
            .filter(|ipam| visible_to(context, ipam))
            .ok_or_else(|| ResourceError::not_found(RESOURCE_NAME, id))?;

        existing.extend(changes);
        debug!("Updated {} {}", RESOURCE_NAME, id);
        Ok(existing.clone())
    }

    async fn delete_ipam(&self, context: &RequestContext, id: &str) -> Result<(), ResourceError> {
        let mut ipams = self.ipams.write().await;
        let in_use = match ipams.get(id).filter(|ipam| visible_to(context, ipam)) {
            Some(ipam) => ipam
                .get("nets_using")
                .and_then(Value::as_array)
                .is_some_and(|nets| !nets.is_empty()),
            None => return Err(ResourceError::not_found(RESOURCE_NAME, id)),
        };
        if in_use {
            return Err(ResourceError::Conflict(format!("{RESOURCE_NAME} {id} is in use by networks")));
        }

        ipams.remove(id);
        debug!("Deleted {} {}", RESOURCE_NAME, id);
        Ok(())
    }
}

fn unwrap_ipam(body: Value) -> Result<Resource, ResourceError> {
    match body {
        Value::Object(mut outer) => match outer.remove(RESOURCE_NAME) {
            Some(Value::Object(attributes)) => Ok(attributes),
            _ => Err(ResourceError::Validation(format!("Expected '{RESOURCE_NAME}' object"))),
        },
        _ => Err(ResourceError::Validation(format!("Expected '{RESOURCE_NAME}' object"))),
    }
}

fn string_attr(resource: &Resource, name: &str) -> Option<String> {
    resource.get(name).and_then(Value::as_str).map(str::to_string)
}

/// Tenant a caller is restricted to, if any
fn tenant_scope(context: &RequestContext) -> Option<&str> {
    if context.is_admin() {
        None
    } else {
        context.tenant_id.as_deref()
    }
}

fn visible_to(context: &RequestContext, resource: &Resource) -> bool {
    tenant_scope(context).is_none_or(|scope| resource.get("tenant_id").and_then(Value::as_str) == Some(scope))
}

fn matches_filters(resource: &Resource, filters: &Filters) -> bool {
    filters.iter().all(|(name, accepted)| {
        resource.get(name).is_some_and(|value| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            accepted.contains(&value)
        })
    })
}

fn project(resource: &Resource, fields: &Fields) -> Resource {
    if fields.is_empty() {
        return resource.clone();
    }
    resource
        .iter()
        .filter(|(name, _)| fields.contains(*name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(tenant: &str, name: &str) -> Value {
        json!({"ipam": {"name": name, "tenant_id": tenant, "mgmt": {"method": "dhcp"}}})
    }

    fn fields(names: &[&str]) -> Fields {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn filters(name: &str, values: &[&str]) -> Filters {
        let mut filters = Filters::new();
        filters.insert(name.to_string(), values.iter().map(|s| (*s).to_string()).collect());
        filters
    }

    #[tokio::test]
    async fn test_create_assigns_identity() {
        let plugin = InMemoryIpamPlugin::new();
        let created = plugin.create_ipam(&RequestContext::admin(), body("t1", "ipam1")).await.unwrap();

        let id = created["id"].as_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(created["tenant_id"], "t1");
        assert_eq!(created["fq_name"], json!(["t1", "ipam1"]));
        assert_eq!(created["nets_using"], json!([]));
        assert_eq!(plugin.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let plugin = InMemoryIpamPlugin::new();
        let ctx = RequestContext::admin();
        plugin.create_ipam(&ctx, body("t1", "ipam1")).await.unwrap();

        let err = plugin.create_ipam(&ctx, body("t1", "ipam1")).await.unwrap_err();
        assert!(matches!(err, ResourceError::Conflict(_)));

        // same name under another tenant is fine
        plugin.create_ipam(&ctx, body("t2", "ipam1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_tenant_scoping() {
        let plugin = InMemoryIpamPlugin::new();
        let admin = RequestContext::admin();
        let other = plugin.create_ipam(&admin, body("t2", "theirs")).await.unwrap();
        plugin.create_ipam(&admin, body("t1", "mine")).await.unwrap();

        let t1 = RequestContext::for_tenant("t1");
        let listed = plugin.get_ipams(&t1, &Filters::new(), &Fields::new()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["name"], "mine");

        let other_id = other["id"].as_str().unwrap();
        let err = plugin.get_ipam(&t1, other_id, &Fields::new()).await.unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));

        let err = plugin.create_ipam(&t1, body("t2", "sneaky")).await.unwrap_err();
        assert!(matches!(err, ResourceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_filters_and_fields() {
        let plugin = InMemoryIpamPlugin::new();
        let ctx = RequestContext::admin();
        for name in ["a", "b", "c"] {
            plugin.create_ipam(&ctx, body("t1", name)).await.unwrap();
        }

        let listed = plugin
            .get_ipams(&ctx, &filters("name", &["a", "c"]), &fields(&["name"]))
            .await
            .unwrap();
        let mut names: Vec<&str> = listed.iter().map(|r| r["name"].as_str().unwrap()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["a", "c"]);
        assert!(listed.iter().all(|r| r.len() == 1));
    }

    #[tokio::test]
    async fn test_update_merges() {
        let plugin = InMemoryIpamPlugin::new();
        let ctx = RequestContext::admin();
        let created = plugin.create_ipam(&ctx, body("t1", "ipam1")).await.unwrap();
        let id = created["id"].as_str().unwrap();

        let updated = plugin.update_ipam(&ctx, id, json!({"ipam": {"mgmt": ""}})).await.unwrap();
        assert_eq!(updated["mgmt"], "");
        assert_eq!(updated["name"], "ipam1");

        let err = plugin.update_ipam(&ctx, "missing", json!({"ipam": {"mgmt": ""}})).await.unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let plugin = InMemoryIpamPlugin::new();
        let ctx = RequestContext::admin();
        let created = plugin.create_ipam(&ctx, body("t1", "ipam1")).await.unwrap();
        let id = created["id"].as_str().unwrap();

        plugin.delete_ipam(&ctx, id).await.unwrap();
        assert!(plugin.is_empty().await);

        let err = plugin.delete_ipam(&ctx, id).await.unwrap_err();
        assert!(matches!(err, ResourceError::NotFound { .. }));
    }
}
