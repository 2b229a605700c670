use relsync_core::{MemoryBackend, ObjectType, ObjectTypeRegistry, ParentRef, RelationSet};

pub const JOIN_TABLE: &str = "icinga_host_hostgroup";
pub const GROUP_TABLE: &str = "icinga_hostgroup";
pub const PARENT_ID: i64 = 1;

#[allow(dead_code)]
pub fn host_type() -> ObjectType {
    ObjectTypeRegistry::with_defaults()
        .get("host")
        .unwrap()
        .clone()
}

#[allow(dead_code)]
pub fn hostgroup_type() -> ObjectType {
    ObjectTypeRegistry::with_defaults()
        .get("hostgroup")
        .unwrap()
        .clone()
}

/// Empty `groups` relation set for host #1
#[allow(dead_code)]
pub fn new_groups() -> RelationSet {
    RelationSet::new(
        ParentRef::new(host_type(), PARENT_ID),
        "groups",
        hostgroup_type(),
    )
}

/// Backend with the given hostgroups, of which `linked` belong to host #1
///
/// Seeding bypasses call recording, so the returned backend has no calls.
#[allow(dead_code)]
pub fn backend_with(groups: &[&str], linked: &[&str]) -> MemoryBackend {
    let mut backend = MemoryBackend::new();
    for name in groups {
        let id = backend.seed_entity(GROUP_TABLE, name);
        if linked.contains(name) {
            backend.seed_link(JOIN_TABLE, PARENT_ID, id);
        }
    }
    backend
}

/// Names of the hostgroups currently linked to host #1 in the backend
#[allow(dead_code)]
pub fn linked_names(backend: &MemoryBackend, groups: &[&str]) -> Vec<String> {
    let rows = backend.join_rows(JOIN_TABLE);
    let mut names: Vec<String> = groups
        .iter()
        .filter_map(|name| backend.find_entity(GROUP_TABLE, name))
        .filter(|row| rows.contains(&(PARENT_ID, row.id)))
        .map(|row| row.object_name)
        .collect();
    names.sort();
    names
}
