//! relsync Engine - Orchestration layer
//!
//! Coordinates relation sets from relsync-core with SQLite persistence from
//! relsync-store, owning transactions and lifecycle logging.

pub mod commands;

pub use commands::relations::{
    relation_load, relation_render, relation_sync, RelationTarget, SyncOutcome, SyncRequest,
};
