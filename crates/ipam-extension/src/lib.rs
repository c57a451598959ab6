//! IPAM Resource Extension
//!
//! Exposes the `ipam` resource through the generic CRUD layer in
//! `resource-api`:
//! - [`attributes`]: the ipam attribute map and descriptor
//! - [`plugin`]: the `IpamPlugin` backend contract and its adapter
//! - [`memory`]: an in-memory backend for development and tests
//!
//! # Example
//!
//! ```no_run
//! use ipam_extension::{InMemoryIpamPlugin, register};
//! use resource_api::ExtensionRegistry;
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), resource_api::ConfigurationError> {
//! let mut registry = ExtensionRegistry::new();
//! register(&mut registry, Arc::new(InMemoryIpamPlugin::new()))?;
//! let router = registry.freeze()?;
//! # let _ = router;
//! # Ok(())
//! # }
//! ```

pub mod attributes;
pub mod memory;
pub mod plugin;

pub use attributes::{COLLECTION_NAME, RESOURCE_NAME, ipam_descriptor};
pub use memory::InMemoryIpamPlugin;
pub use plugin::{IpamPlugin, IpamResource};

use resource_api::{ConfigurationError, ExtensionRegistry, ResourcePlugin};
use std::sync::Arc;

/// Register the ipam resource backed by `plugin`
///
/// # Errors
///
/// [`ConfigurationError`] if `ipams` is already registered or the registry is frozen.
pub fn register<P>(registry: &mut ExtensionRegistry, plugin: Arc<P>) -> Result<(), ConfigurationError>
where
    P: IpamPlugin + 'static,
{
    let resource: Arc<dyn ResourcePlugin> = Arc::new(IpamResource::new(plugin));
    registry.register(ipam_descriptor(), move || resource)
}
