// Integration tests for RelationSet against the in-memory backend.
// Covers load, set, add (all policies), remove, store diffing and rendering.

mod common;

use common::{backend_with, linked_names, new_groups, GROUP_TABLE, JOIN_TABLE, PARENT_ID};
use relsync_core::backend::{BackendCall, BackendOp};
use relsync_core::{
    ConfigRenderer, ExErrorKind, ParentRef, RelatedEntity, RelationError, RelationSet,
    ResolutionPolicy,
};

// ---------------------------------------------------------------------------
// load
// ---------------------------------------------------------------------------

#[test]
fn test_load_populates_membership_and_baseline() {
    let backend = backend_with(&["c", "a", "b"], &["c", "a"]);

    let set = RelationSet::load_for_stored_object(
        ParentRef::new(common::host_type(), PARENT_ID),
        "groups",
        common::hostgroup_type(),
        &backend,
    )
    .unwrap();

    assert_eq!(set.list_related_names(), vec!["a", "c"]);
    assert_eq!(set.list_original_names(), vec!["a", "c"]);
    assert!(!set.has_been_modified());
    assert_eq!(set.get("a").unwrap().kind, "hostgroup");
    assert_eq!(
        backend.calls(),
        vec![BackendCall::QueryJoinRows {
            join_table: JOIN_TABLE.to_string(),
            parent_id: PARENT_ID,
        }]
    );
}

#[test]
fn test_load_with_no_rows_is_empty_not_error() {
    let backend = backend_with(&["a"], &[]);
    let mut set = new_groups();
    set.load(&backend).unwrap();
    assert!(set.is_empty());
    assert_eq!(set.len(), 0);
}

#[test]
fn test_load_then_store_performs_no_writes() {
    let mut backend = backend_with(&["a", "b", "c"], &["a", "b", "c"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();

    let diff = set.store(&mut backend).unwrap();

    assert!(diff.is_empty());
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn test_load_failure_propagates_and_leaves_set_untouched() {
    let mut backend = backend_with(&["a"], &["a"]);
    backend.fail_on(BackendOp::QueryJoinRows);
    let mut set = new_groups();

    let err = set.load(&backend).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert!(set.is_empty());
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

#[test]
fn test_set_same_names_any_order_is_noop() {
    let mut backend = backend_with(&["a", "b"], &["a", "b"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();
    backend.clear_calls();

    set.set(["b", "a"], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert!(!set.has_been_modified());
    assert!(backend.calls().is_empty());
}

#[test]
fn test_set_drops_empty_entries() {
    let mut backend = backend_with(&["a"], &["a"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();

    set.set(["", "a", ""], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert!(!set.has_been_modified());
    assert_eq!(set.list_related_names(), vec!["a"]);
}

#[test]
fn test_set_empty_clears_membership() {
    let mut backend = backend_with(&["a", "b"], &["a", "b"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();

    set.set(Vec::<String>::new(), ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert!(set.is_empty());
    assert!(set.has_been_modified());
    assert_eq!(set.diff().to_delete, vec!["a", "b"]);
}

#[test]
fn test_set_single_reference() {
    let mut backend = backend_with(&["a", "b"], &["a"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();

    set.set(Some("b"), ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert_eq!(set.list_related_names(), vec!["b"]);
}

#[test]
fn test_set_collapses_duplicates() {
    let mut backend = backend_with(&["a", "b"], &[]);
    let mut set = new_groups();

    set.set(["b", "a", "b"], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert_eq!(set.list_related_names(), vec!["a", "b"]);
    assert_eq!(backend.count(BackendOp::QueryByNames), 1);
}

#[test]
fn test_set_accepts_resolved_entities_without_lookup() {
    let mut backend = backend_with(&["a"], &[]);
    let row = backend.find_entity(GROUP_TABLE, "a").unwrap();
    let entity = RelatedEntity::materialize("hostgroup", row);
    let mut set = new_groups();

    set.set(vec![entity.clone()], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert_eq!(set.get("a"), Some(&entity));
    assert_eq!(backend.count(BackendOp::QueryByNames), 0);
}

#[test]
fn test_set_with_missing_name_fails_after_clearing() {
    let mut backend = backend_with(&["a", "b"], &["a"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();

    let err = set
        .set(["b", "nope"], ResolutionPolicy::Fail, &mut backend)
        .unwrap_err();

    assert!(matches!(err, RelationError::ReferenceNotFound { ref name, .. } if name == "nope"));
    assert!(set.has_been_modified());
    assert_eq!(set.list_related_names(), vec!["b"]);
    assert_eq!(set.list_original_names(), vec!["a"]);
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

#[test]
fn test_add_missing_with_fail_policy() {
    let mut backend = backend_with(&["a"], &[]);
    let mut set = new_groups();

    let err = set
        .add("nonexistent", ResolutionPolicy::Fail, &mut backend)
        .unwrap_err();

    assert_eq!(
        err,
        RelationError::ReferenceNotFound {
            related_table: GROUP_TABLE.to_string(),
            name: "nonexistent".to_string(),
        }
    );
    assert!(set.is_empty());
    assert!(!set.has_been_modified());
}

#[test]
fn test_add_missing_with_ignore_policy() {
    let mut backend = backend_with(&["a"], &[]);
    let mut set = new_groups();

    set.add("nonexistent", ResolutionPolicy::Ignore, &mut backend)
        .unwrap();

    assert!(set.is_empty());
    assert!(!set.has_been_modified());
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn test_add_missing_with_autocreate_policy() {
    let mut backend = backend_with(&["a"], &[]);
    let mut set = new_groups();

    set.add("nonexistent", ResolutionPolicy::Autocreate, &mut backend)
        .unwrap();

    let created = backend.find_entity(GROUP_TABLE, "nonexistent").unwrap();
    assert_eq!(created.object_type, "object");

    let member = set.get("nonexistent").unwrap();
    assert_eq!(member.id, created.id);
    assert_eq!(member.kind, "hostgroup");
    assert!(set.has_been_modified());
    assert_eq!(backend.count(BackendOp::InsertEntity), 1);
}

#[test]
fn test_add_all_resolves_in_one_query() {
    let mut backend = backend_with(&["a", "b", "c"], &[]);
    let mut set = new_groups();

    set.add_all(["c", "a", "b"], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    assert_eq!(set.list_related_names(), vec!["a", "b", "c"]);
    assert_eq!(backend.count(BackendOp::QueryByNames), 1);
}

#[test]
fn test_add_all_keeps_references_before_failure() {
    let mut backend = backend_with(&["a", "c"], &[]);
    let mut set = new_groups();

    let err = set
        .add_all(["a", "missing", "c"], ResolutionPolicy::Fail, &mut backend)
        .unwrap_err();

    assert!(matches!(err, RelationError::ReferenceNotFound { .. }));
    assert_eq!(set.list_related_names(), vec!["a"]);
}

#[test]
fn test_add_all_ignore_skips_only_missing() {
    let mut backend = backend_with(&["a", "c"], &[]);
    let mut set = new_groups();

    set.add_all(["a", "missing", "c"], ResolutionPolicy::Ignore, &mut backend)
        .unwrap();

    assert_eq!(set.list_related_names(), vec!["a", "c"]);
}

#[test]
fn test_autocreate_failure_propagates() {
    let mut backend = backend_with(&[], &[]);
    backend.fail_on(BackendOp::InsertEntity);
    let mut set = new_groups();

    let err = set
        .add("fresh", ResolutionPolicy::Autocreate, &mut backend)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert!(set.is_empty());
}

// ---------------------------------------------------------------------------
// remove / store
// ---------------------------------------------------------------------------

#[test]
fn test_remove_then_readd_restores_membership_without_io() {
    let mut backend = backend_with(&["a", "b"], &["a", "b"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();
    let before = set.list_related_names();

    set.remove("a");
    set.add("a", ResolutionPolicy::Fail, &mut backend).unwrap();
    backend.clear_calls();

    assert_eq!(set.list_related_names(), before);
    assert!(set.has_been_modified());

    let diff = set.store(&mut backend).unwrap();
    assert!(diff.is_empty());
    assert_eq!(backend.write_count(), 0);
}

#[test]
fn test_store_touches_only_changed_links() {
    let mut backend = backend_with(&["a", "b", "c", "d"], &["a", "b", "c"]);
    let all = ["a", "b", "c", "d"];
    let mut set = new_groups();
    set.load(&backend).unwrap();

    set.remove("a");
    set.add("d", ResolutionPolicy::Fail, &mut backend).unwrap();
    backend.clear_calls();
    let diff = set.store(&mut backend).unwrap();

    assert_eq!(diff.to_delete, vec!["a"]);
    assert_eq!(diff.to_add, vec!["d"]);
    assert_eq!(backend.count(BackendOp::DeleteJoinRow), 1);
    assert_eq!(backend.count(BackendOp::InsertJoinRow), 1);
    assert_eq!(linked_names(&backend, &all), vec!["b", "c", "d"]);
}

#[test]
fn test_store_keeps_modified_flag() {
    let mut backend = backend_with(&["a"], &[]);
    let mut set = new_groups();
    set.add("a", ResolutionPolicy::Fail, &mut backend).unwrap();

    set.store(&mut backend).unwrap();
    assert!(set.has_been_modified());
    assert!(set.diff().is_empty());

    set.acknowledge_changes();
    assert!(!set.has_been_modified());
}

#[test]
fn test_store_failure_keeps_baseline_for_retry() {
    let mut backend = backend_with(&["a", "b"], &["a"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();
    set.set(["b"], ResolutionPolicy::Fail, &mut backend).unwrap();

    backend.fail_on(BackendOp::InsertJoinRow);
    let err = set.store(&mut backend).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Persistence);
    assert_eq!(set.list_original_names(), vec!["a"]);

    backend.clear_failures();
    let diff = set.store(&mut backend).unwrap();
    assert_eq!(diff.to_delete, vec!["a"]);
    assert_eq!(diff.to_add, vec!["b"]);
    assert_eq!(set.list_original_names(), vec!["b"]);
    assert_eq!(linked_names(&backend, &["a", "b"]), vec!["b"]);
}

#[test]
fn test_store_before_any_load_inserts_everything() {
    let mut backend = backend_with(&["x", "y"], &[]);
    let mut set = new_groups();
    set.set(["y", "x"], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    let diff = set.store(&mut backend).unwrap();

    assert_eq!(diff.to_add, vec!["x", "y"]);
    assert!(diff.to_delete.is_empty());
    assert_eq!(linked_names(&backend, &["x", "y"]), vec!["x", "y"]);
}

// ---------------------------------------------------------------------------
// iteration / end-to-end
// ---------------------------------------------------------------------------

#[test]
fn test_iteration_is_ascending_by_name() {
    let mut backend = backend_with(&["delta", "alpha", "charlie", "bravo"], &[]);
    let mut set = new_groups();
    set.set(["delta", "bravo", "alpha", "charlie"], ResolutionPolicy::Fail, &mut backend)
        .unwrap();

    let names: Vec<&str> = set.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "bravo", "charlie", "delta"]);

    let via_ref: Vec<&str> = (&set).into_iter().map(|e| e.name.as_str()).collect();
    assert_eq!(via_ref, names);
    assert!(set.contains("bravo"));
    assert!(set.get("echo").is_none());
}

#[test]
fn test_end_to_end_set_store_render() {
    let mut backend = backend_with(&["a", "b", "c"], &["a", "b"]);
    let mut set = new_groups();
    set.load(&backend).unwrap();
    backend.clear_calls();

    set.set(["b", "c"], ResolutionPolicy::Fail, &mut backend)
        .unwrap();
    assert!(set.has_been_modified());
    assert_eq!(set.list_related_names(), vec!["b", "c"]);

    let a_id = backend.find_entity(GROUP_TABLE, "a").unwrap().id;
    let c_id = backend.find_entity(GROUP_TABLE, "c").unwrap().id;
    backend.clear_calls();
    set.store(&mut backend).unwrap();

    assert_eq!(
        backend.calls(),
        vec![
            BackendCall::DeleteJoinRow {
                join_table: JOIN_TABLE.to_string(),
                parent_id: PARENT_ID,
                related_id: a_id,
            },
            BackendCall::InsertJoinRow {
                join_table: JOIN_TABLE.to_string(),
                parent_id: PARENT_ID,
                related_id: c_id,
            },
        ]
    );
    assert_eq!(set.list_original_names(), vec!["b", "c"]);
    assert_eq!(
        set.to_config_string().unwrap(),
        "    groups = [ \"b\", \"c\" ]\n"
    );
}

#[test]
fn test_empty_membership_renders_empty_string() {
    let set = new_groups();
    assert_eq!(set.to_config_string().unwrap(), "");
}
