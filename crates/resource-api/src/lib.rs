//! Resource Extension API
//!
//! A generic CRUD dispatch layer that exposes declared resource types over
//! HTTP and delegates every operation to a backend plugin.
//!
//! A resource extension is made of:
//! - an [`AttributeSchema`] describing the resource's fields
//! - a [`ResourceDescriptor`] binding singular/plural names to that schema
//! - a [`ResourcePlugin`] implementation providing persistence
//!
//! The [`ExtensionRegistry`] wires descriptors and plugins into an `axum`
//! router at process start:
//!
//! | Method   | Path              | Status |
//! |----------|-------------------|--------|
//! | `POST`   | `/<plural>`       | 201    |
//! | `GET`    | `/<plural>`       | 200    |
//! | `GET`    | `/<plural>/<id>`  | 200    |
//! | `PUT`    | `/<plural>/<id>`  | 200    |
//! | `DELETE` | `/<plural>/<id>`  | 204    |
//!
//! # Example
//!
//! ```no_run
//! use resource_api::{
//!     AttributeSchema, AttributeSpec, AttributeType, ExtensionRegistry, ResourceDescriptor,
//! };
//!
//! # fn example(plugin: std::sync::Arc<dyn resource_api::ResourcePlugin>)
//! #     -> Result<(), resource_api::ConfigurationError> {
//! let schema = AttributeSchema::new()
//!     .attribute("id", AttributeSpec::new(AttributeType::Uuid))
//!     .attribute("name", AttributeSpec::new(AttributeType::String).allow_post().default_value(""));
//!
//! let mut registry = ExtensionRegistry::new();
//! registry.register(ResourceDescriptor::new("widget", schema), move || plugin)?;
//! let router = registry.freeze()?;
//! # let _ = router;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod controller;
pub mod descriptor;
pub mod error;
pub mod plugin;
pub mod query;
pub mod registry;
pub mod routes;
pub mod schema;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use context::RequestContext;
pub use controller::{ResourceController, ResourceResponse};
pub use descriptor::ResourceDescriptor;
pub use error::{ConfigurationError, ResourceError};
pub use plugin::{Fields, Filters, Resource, ResourcePlugin};
pub use query::ListQuery;
pub use registry::ExtensionRegistry;
pub use schema::{AttributeSchema, AttributeSpec, AttributeType, Operation};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockResourcePlugin, PluginCall};
