//! Extension registrar
//!
//! Collects resource descriptors and their plugins at process start and
//! turns them into a routing table. Registration is single-shot: once the
//! registry is frozen no further resource can be added.

use crate::controller::ResourceController;
use crate::descriptor::ResourceDescriptor;
use crate::error::ConfigurationError;
use crate::plugin::ResourcePlugin;
use crate::routes::resource_router;
use axum::Router;
use std::sync::Arc;
use tracing::info;

/// Startup-time registry of resource extensions
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
    controllers: Vec<ResourceController>,
    frozen: bool,
}

impl ExtensionRegistry {
    /// Empty, unfrozen registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource and the plugin serving it
    ///
    /// The factory is only invoked once the descriptor has been accepted.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError`] when the registry is frozen, the descriptor is
    /// invalid, or its plural name is already taken.
    pub fn register<F>(&mut self, descriptor: ResourceDescriptor, plugin_factory: F) -> Result<(), ConfigurationError>
    where
        F: FnOnce() -> Arc<dyn ResourcePlugin>,
    {
        if self.frozen {
            return Err(ConfigurationError::RegistryFrozen(descriptor.plural().to_string()));
        }
        descriptor.validate()?;
        if self.is_registered(descriptor.plural()) {
            return Err(ConfigurationError::DuplicateResource(descriptor.plural().to_string()));
        }

        info!(
            "Registered resource '{}' at /{} ({} attributes)",
            descriptor.singular(),
            descriptor.derive_path(),
            descriptor.schema().len()
        );
        self.controllers
            .push(ResourceController::new(Arc::new(descriptor), plugin_factory()));
        Ok(())
    }

    /// Whether a collection with this plural name is registered
    #[must_use]
    pub fn is_registered(&self, plural: &str) -> bool {
        self.controllers.iter().any(|c| c.descriptor().plural() == plural)
    }

    /// Registered descriptors, in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.controllers.iter().map(ResourceController::descriptor)
    }

    /// Whether the routing table has been built
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the registry and build the routing table
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::RegistryFrozen`] if called twice.
    pub fn freeze(&mut self) -> Result<Router, ConfigurationError> {
        if self.frozen {
            return Err(ConfigurationError::RegistryFrozen("<routing table>".to_string()));
        }
        self.frozen = true;

        let router = self
            .controllers
            .iter()
            .cloned()
            .fold(Router::new(), |router, controller| router.merge(resource_router(controller)));
        info!("Routing table frozen with {} resource(s)", self.controllers.len());
        Ok(router)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockResourcePlugin;
    use crate::schema::{AttributeSchema, AttributeSpec, AttributeType};

    fn descriptor(name: &str) -> ResourceDescriptor {
        ResourceDescriptor::new(
            name,
            AttributeSchema::new().attribute("id", AttributeSpec::new(AttributeType::Uuid)),
        )
    }

    fn plugin() -> Arc<dyn ResourcePlugin> {
        Arc::new(MockResourcePlugin::new())
    }

    #[test]
    fn test_register_and_freeze() {
        let mut registry = ExtensionRegistry::new();
        registry.register(descriptor("ipam"), plugin).unwrap();
        registry.register(descriptor("policy"), plugin).unwrap();

        assert!(registry.is_registered("ipams"));
        assert!(registry.is_registered("policies"));
        assert_eq!(registry.descriptors().count(), 2);
        assert!(registry.freeze().is_ok());
        assert!(registry.is_frozen());
    }

    #[test]
    fn test_duplicate_plural_rejected() {
        let mut registry = ExtensionRegistry::new();
        registry.register(descriptor("ipam"), plugin).unwrap();

        let err = registry
            .register(descriptor("other").with_plural("ipams"), plugin)
            .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateResource("ipams".into()));
    }

    #[test]
    fn test_register_after_freeze_rejected() {
        let mut registry = ExtensionRegistry::new();
        assert!(registry.freeze().is_ok());

        let err = registry.register(descriptor("ipam"), plugin).unwrap_err();
        assert_eq!(err, ConfigurationError::RegistryFrozen("ipams".into()));
        assert!(registry.freeze().is_err());
    }

    #[test]
    fn test_factory_not_called_on_failure() {
        let mut registry = ExtensionRegistry::new();
        let err = registry
            .register(descriptor("Bad Name"), || -> Arc<dyn ResourcePlugin> { panic!("factory must not run") })
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidName(_)));
    }
}
