//! Attribute schema
//!
//! Declarative, field-level contract for a resource's wire representation.
//! A schema is immutable once its resource is registered.

use crate::error::{ConfigurationError, ResourceError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Name of the identity attribute every schema must declare
pub const ID_ATTRIBUTE: &str = "id";

/// Semantic type of an attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    /// JSON string
    String,
    /// JSON string holding a UUID
    Uuid,
    /// JSON object
    Object,
    /// JSON boolean
    Boolean,
    /// JSON integer
    Integer,
    /// JSON array
    List,
    /// Any JSON value, including `null`
    Any,
}

impl AttributeType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Uuid => value.as_str().is_some_and(|s| Uuid::parse_str(s).is_ok()),
            Self::Object => value.is_object(),
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::List => value.is_array(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Uuid => "uuid",
            Self::Object => "object",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::List => "list",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

/// Write operation a request body is validated for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `POST /<plural>`
    Create,
    /// `PUT /<plural>/<id>`
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("POST"),
            Self::Update => f.write_str("PUT"),
        }
    }
}

/// Specification of a single attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    /// Semantic type
    pub kind: AttributeType,
    /// Accepted in create bodies
    pub allow_post: bool,
    /// Accepted in update bodies
    pub allow_put: bool,
    /// Value applied on create when the caller omits the attribute
    pub default: Option<Value>,
    /// Returned to callers; internal-only attributes are stripped from responses
    pub visible: bool,
}

impl AttributeSpec {
    /// Read-only, visible attribute of the given type
    #[must_use]
    pub fn new(kind: AttributeType) -> Self {
        Self {
            kind,
            allow_post: false,
            allow_put: false,
            default: None,
            visible: true,
        }
    }

    /// Accept the attribute on create
    #[must_use]
    pub fn allow_post(mut self) -> Self {
        self.allow_post = true;
        self
    }

    /// Accept the attribute on update
    #[must_use]
    pub fn allow_put(mut self) -> Self {
        self.allow_put = true;
        self
    }

    /// Default applied on create
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Hide the attribute from responses
    #[must_use]
    pub fn internal(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Must the caller supply this attribute on create?
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.allow_post && self.default.is_none()
    }

    fn allowed_for(&self, operation: Operation) -> bool {
        match operation {
            Operation::Create => self.allow_post,
            Operation::Update => self.allow_put,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.kind == AttributeType::Any || self.default.as_ref().is_some_and(Value::is_null);
        }
        self.kind.accepts(value)
    }
}

/// Field name to [`AttributeSpec`] mapping for one resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSchema {
    attributes: BTreeMap<String, AttributeSpec>,
}

impl AttributeSchema {
    /// Empty schema
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) an attribute
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, spec: AttributeSpec) -> Self {
        self.attributes.insert(name.into(), spec);
        self
    }

    /// Look up an attribute
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeSpec> {
        self.attributes.get(name)
    }

    /// Whether the attribute is declared
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeSpec)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of declared attributes
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether no attribute is declared
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Validate the attributes of a request body for `operation`
    ///
    /// Returns the sanitized attributes: only declared fields, with defaults
    /// filled in on create. Fields the operation does not allow are rejected
    /// rather than dropped.
    ///
    /// # Errors
    ///
    /// [`ResourceError::Validation`] naming the first offending field.
    pub fn validate(
        &self,
        body: &Map<String, Value>,
        operation: Operation,
    ) -> Result<Map<String, Value>, ResourceError> {
        let unknown: Vec<&str> = body
            .keys()
            .filter(|k| !self.contains(k))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            return Err(ResourceError::Validation(format!(
                "Unrecognized attribute(s) '{}'",
                unknown.join(", ")
            )));
        }

        if operation == Operation::Update && body.is_empty() {
            return Err(ResourceError::Validation(
                "Update body must contain at least one attribute".to_string(),
            ));
        }

        let mut sanitized = Map::new();
        for (name, value) in body {
            let Some(spec) = self.get(name) else { continue };
            if !spec.allowed_for(operation) {
                return Err(ResourceError::Validation(match operation {
                    Operation::Create => format!("Attribute '{name}' not allowed in POST"),
                    Operation::Update => format!("Cannot update read-only attribute '{name}'"),
                }));
            }
            if !spec.accepts(value) {
                return Err(ResourceError::Validation(format!(
                    "Invalid value for attribute '{name}': expected {}",
                    spec.kind
                )));
            }
            sanitized.insert(name.clone(), value.clone());
        }

        if operation == Operation::Create {
            for (name, spec) in self.iter().filter(|(_, s)| s.allow_post) {
                if sanitized.contains_key(name) {
                    continue;
                }
                match &spec.default {
                    Some(default) => {
                        sanitized.insert(name.to_string(), default.clone());
                    }
                    None => {
                        return Err(ResourceError::Validation(format!(
                            "Failed to parse request. Required attribute '{name}' not specified"
                        )));
                    }
                }
            }
        }

        Ok(sanitized)
    }

    /// Check that an attribute name can be used as a query key
    ///
    /// # Errors
    ///
    /// [`ResourceError::Validation`] when the attribute is not declared.
    pub fn require_known(&self, name: &str, usage: &str) -> Result<(), ResourceError> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(ResourceError::Validation(format!(
                "Unknown attribute '{name}' in {usage}"
            )))
        }
    }

    /// Remove internal-only attributes from a plugin result
    pub fn strip_internal(&self, resource: &mut Map<String, Value>) {
        resource.retain(|name, _| self.get(name).is_none_or(|spec| spec.visible));
    }

    /// Structural checks run at registration
    pub(crate) fn check(&self, resource: &str) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidSchema {
            resource: resource.to_string(),
            reason: reason.to_string(),
        };

        let id = self
            .get(ID_ATTRIBUTE)
            .ok_or_else(|| invalid("missing 'id' attribute"))?;
        if id.allow_post || id.allow_put {
            return Err(invalid("'id' must not be writable"));
        }
        if self.contains("") {
            return Err(invalid("empty attribute name"));
        }
        Ok(())
    }
}
