//! relsync Store - SQLite persistence for relation sets
//!
//! Provides:
//! - Connection helpers
//! - Embedded SQL migrations with checksums
//! - `SqliteBackend`, the SQLite implementation of `RelationBackend`
//! - `ObjectRepo` helpers for creating and finding configuration objects

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;

// Re-export key types
pub use errors::Result;
pub use repo::{ObjectRepo, SqliteBackend};
