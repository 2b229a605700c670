//! Object-type registry
//!
//! Explicit mapping from a type tag (`hostgroup`) to its table layout. Relation
//! sets are built from registry entries instead of deriving table names from
//! type names.

use std::collections::BTreeMap;

use crate::errors::{RelationError, Result};
use crate::model::ObjectType;

/// Registry of known object types, keyed by tag
#[derive(Debug, Clone, Default)]
pub struct ObjectTypeRegistry {
    types: BTreeMap<String, ObjectType>,
}

impl ObjectTypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the host, service and user object types
    /// and their group types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for tag in [
            "host",
            "hostgroup",
            "service",
            "servicegroup",
            "user",
            "usergroup",
        ] {
            registry.types.insert(
                tag.to_string(),
                ObjectType {
                    tag: tag.to_string(),
                    table: format!("icinga_{}", tag),
                    short_name: tag.to_string(),
                },
            );
        }
        registry
    }

    /// Load registry entries from a JSON array of `{tag, table, short_name}`
    ///
    /// # Errors
    /// * `InvalidInput` - If the JSON does not parse
    /// * `InvalidIdentifier` - If an entry has a non-identifier part
    pub fn from_json_str(json: &str) -> Result<Self> {
        let entries: Vec<ObjectType> =
            serde_json::from_str(json).map_err(|e| RelationError::InvalidInput {
                reason: format!("invalid object type registry JSON: {}", e),
            })?;

        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry)?;
        }
        Ok(registry)
    }

    /// Add or replace an entry
    ///
    /// # Errors
    /// * `InvalidIdentifier` - If the entry has a non-identifier part
    pub fn register(&mut self, object_type: ObjectType) -> Result<()> {
        object_type.validate()?;
        self.types.insert(object_type.tag.clone(), object_type);
        Ok(())
    }

    /// Look up an entry by tag
    ///
    /// # Errors
    /// * `UnknownObjectType` - If no entry has this tag
    pub fn get(&self, tag: &str) -> Result<&ObjectType> {
        self.types
            .get(tag)
            .ok_or_else(|| RelationError::UnknownObjectType {
                tag: tag.to_string(),
            })
    }

    /// Registered tags in ascending order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}
