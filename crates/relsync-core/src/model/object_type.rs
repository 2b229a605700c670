use serde::{Deserialize, Serialize};

use crate::errors::{RelationError, Result};

/// Descriptor for one kind of configuration object
///
/// `table` is where rows of this kind live; `short_name` is the stem used for
/// id columns (`{short_name}_id`) and join-table suffixes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectType {
    pub tag: String,
    pub table: String,
    pub short_name: String,
}

impl ObjectType {
    /// Create a validated object type
    ///
    /// # Errors
    /// * `InvalidIdentifier` - If any part is not a plain SQL identifier
    pub fn new(
        tag: impl Into<String>,
        table: impl Into<String>,
        short_name: impl Into<String>,
    ) -> Result<Self> {
        let object_type = Self {
            tag: tag.into(),
            table: table.into(),
            short_name: short_name.into(),
        };
        object_type.validate()?;
        Ok(object_type)
    }

    /// Check that tag, table and short name are usable as SQL identifiers
    ///
    /// # Errors
    /// * `InvalidIdentifier` - On the first part that is not
    pub fn validate(&self) -> Result<()> {
        for part in [&self.tag, &self.table, &self.short_name] {
            ensure_identifier(part)?;
        }
        Ok(())
    }

    /// Column holding this type's id in join tables
    pub fn id_column(&self) -> String {
        format!("{}_id", self.short_name)
    }
}

/// Fail unless `s` matches `[A-Za-z_][A-Za-z0-9_]*`
///
/// # Errors
/// * `InvalidIdentifier` - If it does not
pub fn ensure_identifier(s: &str) -> Result<()> {
    let mut chars = s.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RelationError::InvalidIdentifier {
            identifier: s.to_string(),
        })
    }
}

/// Back reference to the object owning a relation set
///
/// Identifies the parent by type and numeric id only; the parent itself is
/// owned elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRef {
    pub object_type: ObjectType,
    pub id: i64,
}

impl ParentRef {
    pub fn new(object_type: ObjectType, id: i64) -> Self {
        Self { object_type, id }
    }

    /// Short type name of the parent (e.g. `host`)
    pub fn type_name(&self) -> &str {
        &self.object_type.short_name
    }
}

/// Physical layout of the join table linking a parent type to a related type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSpec {
    pub join_table: String,
    pub parent_id_column: String,
    pub related_table: String,
    pub related_id_column: String,
}

impl JoinSpec {
    /// Derive the join layout: `{parent_table}_{related_short}` with columns
    /// `{parent_short}_id` and `{related_short}_id`
    pub fn between(parent: &ObjectType, related: &ObjectType) -> Self {
        Self {
            join_table: format!("{}_{}", parent.table, related.short_name),
            parent_id_column: parent.id_column(),
            related_table: related.table.clone(),
            related_id_column: related.id_column(),
        }
    }
}
