//! IPAM attribute map

use resource_api::{AttributeSchema, AttributeSpec, AttributeType, ResourceDescriptor};
use serde_json::Value;

/// Singular resource name
pub const RESOURCE_NAME: &str = "ipam";

/// Plural resource name and collection path
pub const COLLECTION_NAME: &str = "ipams";

/// Attribute schema for an ipam
#[must_use]
pub fn ipam_attributes() -> AttributeSchema {
    AttributeSchema::new()
        .attribute("id", AttributeSpec::new(AttributeType::Uuid))
        .attribute(
            "name",
            AttributeSpec::new(AttributeType::String).allow_post().default_value(""),
        )
        .attribute("fq_name", AttributeSpec::new(AttributeType::Any))
        .attribute("tenant_id", AttributeSpec::new(AttributeType::String).allow_post())
        // mgmt carries backend-specific management parameters, any shape
        .attribute(
            "mgmt",
            AttributeSpec::new(AttributeType::Any)
                .allow_post()
                .allow_put()
                .default_value(Value::Null),
        )
        .attribute("nets_using", AttributeSpec::new(AttributeType::Any))
}

/// Descriptor registering `ipam` at `/ipams`
#[must_use]
pub fn ipam_descriptor() -> ResourceDescriptor {
    ResourceDescriptor::new(RESOURCE_NAME, ipam_attributes()).with_plural(COLLECTION_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let descriptor = ipam_descriptor();
        assert_eq!(descriptor.singular(), "ipam");
        assert_eq!(descriptor.derive_path(), "ipams");
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_write_permissions() {
        let schema = ipam_attributes();
        let writable_on_create: Vec<&str> = schema.iter().filter(|(_, s)| s.allow_post).map(|(n, _)| n).collect();
        let writable_on_update: Vec<&str> = schema.iter().filter(|(_, s)| s.allow_put).map(|(n, _)| n).collect();

        assert_eq!(writable_on_create, vec!["mgmt", "name", "tenant_id"]);
        assert_eq!(writable_on_update, vec!["mgmt"]);
        assert!(schema.get("tenant_id").is_some_and(AttributeSpec::is_required));
    }
}
