pub mod entity;
pub mod object_type;

pub use entity::{EntityRow, NewEntity, RelatedEntity, RelationRef, DEFAULT_OBJECT_TYPE};
pub use object_type::{JoinSpec, ObjectType, ParentRef};
