//! Resource descriptor
//!
//! Binds a resource's singular and plural names to its attribute schema and
//! derives the URL paths and body wrapping keys from them.

use crate::error::ConfigurationError;
use crate::schema::AttributeSchema;

/// Static description of an exposed resource type
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    singular: String,
    plural: String,
    schema: AttributeSchema,
}

impl ResourceDescriptor {
    /// Describe a resource, deriving its plural name from `singular`
    pub fn new(singular: impl Into<String>, schema: AttributeSchema) -> Self {
        let singular = singular.into();
        let plural = pluralize(&singular);
        Self {
            singular,
            plural,
            schema,
        }
    }

    /// Override the derived plural name
    #[must_use]
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = plural.into();
        self
    }

    /// Singular name, also the body key for single-object operations
    #[must_use]
    pub fn singular(&self) -> &str {
        &self.singular
    }

    /// Plural name, also the body key for list responses
    #[must_use]
    pub fn plural(&self) -> &str {
        &self.plural
    }

    /// Attribute schema
    #[must_use]
    pub fn schema(&self) -> &AttributeSchema {
        &self.schema
    }

    /// Collection path, e.g. `ipams`
    #[must_use]
    pub fn derive_path(&self) -> String {
        self.plural.clone()
    }

    /// Member path, e.g. `ipams/<id>`
    #[must_use]
    pub fn derive_member_path(&self, id: &str) -> String {
        format!("{}/{}", self.plural, id)
    }

    /// Validate names and schema before registration
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidName`] for unusable names,
    /// [`ConfigurationError::InvalidSchema`] for a malformed schema.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for name in [&self.singular, &self.plural] {
            if !is_valid_name(name) {
                return Err(ConfigurationError::InvalidName(name.clone()));
            }
        }
        if self.singular == self.plural {
            return Err(ConfigurationError::InvalidName(format!(
                "{} (singular and plural must differ)",
                self.singular
            )));
        }
        self.schema.check(&self.singular)
    }
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

/// English plural of a resource name
#[must_use]
pub fn pluralize(singular: &str) -> String {
    if let Some(stem) = singular.strip_suffix('y') {
        let consonant_before = stem
            .chars()
            .last()
            .is_some_and(|c| c.is_ascii_alphabetic() && !"aeiou".contains(c));
        if consonant_before {
            return format!("{stem}ies");
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|suffix| singular.ends_with(suffix)) {
        return format!("{singular}es");
    }
    format!("{singular}s")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AttributeSpec, AttributeType, ID_ATTRIBUTE};

    fn schema() -> AttributeSchema {
        AttributeSchema::new().attribute(ID_ATTRIBUTE, AttributeSpec::new(AttributeType::Uuid))
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("ipam"), "ipams");
        assert_eq!(pluralize("policy"), "policies");
        assert_eq!(pluralize("gateway"), "gateways");
        assert_eq!(pluralize("address"), "addresses");
        assert_eq!(pluralize("switch"), "switches");
    }

    #[test]
    fn test_paths() {
        let descriptor = ResourceDescriptor::new("ipam", schema());
        assert_eq!(descriptor.derive_path(), "ipams");
        assert_eq!(descriptor.derive_member_path("abc"), "ipams/abc");
    }

    #[test]
    fn test_plural_override() {
        let descriptor = ResourceDescriptor::new("child", schema()).with_plural("children");
        assert_eq!(descriptor.plural(), "children");
        assert_eq!(descriptor.derive_path(), "children");
    }

    #[test]
    fn test_validate_names() {
        assert!(ResourceDescriptor::new("ipam", schema()).validate().is_ok());
        assert!(matches!(
            ResourceDescriptor::new("IPAM", schema()).validate(),
            Err(ConfigurationError::InvalidName(_))
        ));
        assert!(matches!(
            ResourceDescriptor::new("sheep", schema()).with_plural("sheep").validate(),
            Err(ConfigurationError::InvalidName(_))
        ));
        assert!(matches!(
            ResourceDescriptor::new("ipam", AttributeSchema::new()).validate(),
            Err(ConfigurationError::InvalidSchema { .. })
        ));
    }
}
