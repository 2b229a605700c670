//! Relation commands
//!
//! The engine layer owns lifecycle logging for relation operations:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure
//!
//! Lower layers (store, core) use only `tracing::debug!()` for internal details.

#![allow(clippy::result_large_err)]

use relsync_core::{
    log_op_end, log_op_error, log_op_start, ConfigRenderer, ObjectTypeRegistry, ParentRef,
    RelationDiff, RelationSet, ResolutionPolicy,
};
use relsync_store::errors::{from_rusqlite, Result};
use relsync_store::SqliteBackend;
use rusqlite::Connection;

/// Which relation of which object a command works on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTarget {
    /// Registry tag of the owning object's type, e.g. `host`
    pub parent_tag: String,
    pub parent_id: i64,
    /// Attribute the relation renders as, e.g. `groups`
    pub property: String,
    /// Registry tag of the related objects' type, e.g. `hostgroup`
    pub related_tag: String,
}

impl RelationTarget {
    pub fn new(
        parent_tag: impl Into<String>,
        parent_id: i64,
        property: impl Into<String>,
        related_tag: impl Into<String>,
    ) -> Self {
        Self {
            parent_tag: parent_tag.into(),
            parent_id,
            property: property.into(),
            related_tag: related_tag.into(),
        }
    }

    fn empty_set(&self, registry: &ObjectTypeRegistry) -> Result<RelationSet> {
        let parent_type = registry.get(&self.parent_tag)?.clone();
        let related_type = registry.get(&self.related_tag)?.clone();
        Ok(RelationSet::new(
            ParentRef::new(parent_type, self.parent_id),
            self.property.clone(),
            related_type,
        ))
    }
}

/// Replace a relation's membership with `names`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub target: RelationTarget,
    pub names: Vec<String>,
    pub policy: ResolutionPolicy,
}

/// Result of a committed sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Join rows deleted and inserted, by related name
    pub diff: RelationDiff,
    /// Whether the request changed membership at all
    pub modified: bool,
    /// Rendered directive for the new membership; empty when there is none
    pub directive: String,
}

/// Load the persisted membership of a relation
///
/// # Errors
/// - `UnknownObjectType`: parent or related tag not registered
/// - `Persistence`: Database error
pub fn relation_load(
    conn: &Connection,
    registry: &ObjectTypeRegistry,
    target: &RelationTarget,
) -> Result<RelationSet> {
    log_op_start!(
        "relation_load",
        parent_table = %target.parent_tag,
        parent_id = target.parent_id,
        property = %target.property
    );
    let start = std::time::Instant::now();

    let result = relation_load_impl(conn, registry, target).map_err(|e| {
        log_op_error!(
            "relation_load",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "relation_load",
        duration_ms = start.elapsed().as_millis() as u64,
        member_count = result.len()
    );

    Ok(result)
}

fn relation_load_impl(
    conn: &Connection,
    registry: &ObjectTypeRegistry,
    target: &RelationTarget,
) -> Result<RelationSet> {
    let mut set = target.empty_set(registry)?;
    set.load(&SqliteBackend::new(conn))?;
    Ok(set)
}

/// Set a relation's membership and persist the difference atomically
///
/// Runs load, set, store and render inside one transaction. Any failure drops
/// the transaction, so neither join rows nor autocreated objects survive it.
///
/// # Errors
/// - `UnknownObjectType`: parent or related tag not registered
/// - `ReferenceNotFound`: a name does not resolve under `ResolutionPolicy::Fail`
/// - `Render`: the property is not a valid attribute name
/// - `Persistence`: Database error
pub fn relation_sync(
    conn: &mut Connection,
    registry: &ObjectTypeRegistry,
    request: SyncRequest,
) -> Result<SyncOutcome> {
    log_op_start!(
        "relation_sync",
        parent_table = %request.target.parent_tag,
        parent_id = request.target.parent_id,
        property = %request.target.property,
        member_count = request.names.len(),
        policy = request.policy.as_str()
    );
    let start = std::time::Instant::now();

    let outcome = relation_sync_impl(conn, registry, request).map_err(|e| {
        log_op_error!(
            "relation_sync",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "relation_sync",
        duration_ms = start.elapsed().as_millis() as u64,
        to_add_len = outcome.diff.to_add.len(),
        to_delete_len = outcome.diff.to_delete.len()
    );

    Ok(outcome)
}

fn relation_sync_impl(
    conn: &mut Connection,
    registry: &ObjectTypeRegistry,
    request: SyncRequest,
) -> Result<SyncOutcome> {
    let mut set = request.target.empty_set(registry)?;

    let tx = conn.transaction().map_err(from_rusqlite)?;
    let outcome = {
        let mut backend = SqliteBackend::new(&tx);
        set.load(&backend)?;
        set.set(request.names, request.policy, &mut backend)?;
        let modified = set.has_been_modified();
        let diff = set.store(&mut backend)?;
        let directive = set.to_config_string()?;
        SyncOutcome {
            diff,
            modified,
            directive,
        }
    };
    tx.commit().map_err(from_rusqlite)?;

    Ok(outcome)
}

/// Render the persisted membership of a relation as a config directive
///
/// # Errors
/// - `UnknownObjectType`: parent or related tag not registered
/// - `Render`: the property is not a valid attribute name
/// - `Persistence`: Database error
pub fn relation_render(
    conn: &Connection,
    registry: &ObjectTypeRegistry,
    target: &RelationTarget,
) -> Result<String> {
    log_op_start!(
        "relation_render",
        parent_table = %target.parent_tag,
        parent_id = target.parent_id,
        property = %target.property
    );
    let start = std::time::Instant::now();

    let result = relation_load_impl(conn, registry, target)
        .and_then(|set| Ok(set.to_config_string()?))
        .map_err(|e| {
            log_op_error!(
                "relation_render",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "relation_render",
        duration_ms = start.elapsed().as_millis() as u64
    );

    Ok(result)
}
