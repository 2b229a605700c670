use serde::{Deserialize, Serialize};

/// Object type recorded for rows created on the fly
pub const DEFAULT_OBJECT_TYPE: &str = "object";

/// Raw related-entity row as returned by the persistence layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub id: i64,
    pub object_name: String,
    pub object_type: String,
}

/// Fields for inserting a new related entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntity {
    pub object_name: String,
    pub object_type: String,
}

impl NewEntity {
    /// Minimal entity: generic object type, given name
    pub fn minimal(name: impl Into<String>) -> Self {
        Self {
            object_name: name.into(),
            object_type: DEFAULT_OBJECT_TYPE.to_string(),
        }
    }
}

/// A concrete related configuration object
///
/// `kind` is the registry tag of its object type. Values are plain data:
/// cloning yields an independent snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedEntity {
    pub id: i64,
    pub name: String,
    pub object_type: String,
    pub kind: String,
}

impl RelatedEntity {
    /// Build a typed entity from a persisted row
    pub fn materialize(kind: &str, row: EntityRow) -> Self {
        Self {
            id: row.id,
            name: row.object_name,
            object_type: row.object_type,
            kind: kind.to_string(),
        }
    }
}

/// Reference to a related object: either its name or the object itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationRef {
    Name(String),
    Entity(RelatedEntity),
}

impl RelationRef {
    /// Name this reference points at
    pub fn name(&self) -> &str {
        match self {
            RelationRef::Name(name) => name,
            RelationRef::Entity(entity) => &entity.name,
        }
    }

    /// Empty name strings count as absent entries
    pub fn is_empty(&self) -> bool {
        matches!(self, RelationRef::Name(name) if name.is_empty())
    }
}

impl From<&str> for RelationRef {
    fn from(name: &str) -> Self {
        RelationRef::Name(name.to_string())
    }
}

impl From<String> for RelationRef {
    fn from(name: String) -> Self {
        RelationRef::Name(name)
    }
}

impl From<&String> for RelationRef {
    fn from(name: &String) -> Self {
        RelationRef::Name(name.clone())
    }
}

impl From<RelatedEntity> for RelationRef {
    fn from(entity: RelatedEntity) -> Self {
        RelationRef::Entity(entity)
    }
}
