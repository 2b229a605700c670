//! Repository layer for relation sets and the objects they link
//!
//! `SqliteBackend` adapts a connection (or transaction) to the core
//! `RelationBackend` interface; `ObjectRepo` manages parent objects.

pub mod object_repo;
pub mod sqlite_backend;

pub use object_repo::ObjectRepo;
pub use sqlite_backend::SqliteBackend;
