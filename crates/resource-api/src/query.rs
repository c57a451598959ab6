//! Query string handling for list and get requests
//!
//! Filters and field selectors are parsed into plain collections and handed
//! to the plugin untouched; only the backend knows how to apply them.

use crate::error::ResourceError;
use crate::plugin::{Fields, Filters};
use crate::schema::AttributeSchema;
use tracing::debug;

/// Query key selecting response attributes
pub const FIELDS_KEY: &str = "fields";

/// Pagination and sorting keys accepted but not interpreted here
pub const RESERVED_KEYS: &[&str] = &["limit", "marker", "page_reverse", "sort_key", "sort_dir"];

/// Parsed list/get query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Attribute filters
    pub filters: Filters,
    /// Field projection
    pub fields: Fields,
}

impl ListQuery {
    /// Parse raw query pairs against a schema
    ///
    /// Repeated keys accumulate. Filters or fields naming undeclared
    /// attributes make the query malformed.
    ///
    /// # Errors
    ///
    /// [`ResourceError::Validation`] for malformed queries.
    pub fn parse(pairs: &[(String, String)], schema: &AttributeSchema) -> Result<Self, ResourceError> {
        let mut query = Self::default();

        for (key, value) in pairs {
            if key.is_empty() {
                return Err(ResourceError::Validation("Empty query parameter name".to_string()));
            }
            if key == FIELDS_KEY {
                if !value.is_empty() {
                    schema.require_known(value, "fields")?;
                    query.fields.insert(value.clone());
                }
                continue;
            }
            if RESERVED_KEYS.contains(&key.as_str()) {
                debug!("Ignoring query parameter {}", key);
                continue;
            }
            schema.require_known(key, "filters")?;
            query.filters.entry(key.clone()).or_default().insert(value.clone());
        }

        Ok(query)
    }

    /// Collect the field selector of a single-resource query
    ///
    /// Every other key is ignored and field names are passed through as given.
    #[must_use]
    pub fn parse_fields(pairs: &[(String, String)]) -> Fields {
        pairs
            .iter()
            .filter(|(key, value)| key == FIELDS_KEY && !value.is_empty())
            .map(|(_, value)| value.clone())
            .collect()
    }
}
