//! relsync Core - many-to-many relation set synchronizer
//!
//! This crate provides:
//! - Object-type registry describing tables and join-column naming
//! - Related entity model and relation references
//! - The persistence collaborator trait plus an in-memory implementation
//! - Batched name resolution under a configurable resolution policy
//! - `RelationSet`: lazy load, in-memory mutation, minimal-diff store
//! - Rendering of a relation set as a configuration directive
//! - Error and logging facilities shared by the store and engine crates

pub mod backend;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod registry;
pub mod relation_set;
pub mod render;
pub mod resolver;

// Re-export commonly used types
pub use backend::{MemoryBackend, RelationBackend};
pub use errors::{ExError, ExErrorKind, RelationError, Result};
pub use model::{JoinSpec, ObjectType, ParentRef, RelatedEntity, RelationRef};
pub use registry::ObjectTypeRegistry;
pub use relation_set::{RelationDiff, RelationSet};
pub use render::ConfigRenderer;
pub use resolver::ResolutionPolicy;
