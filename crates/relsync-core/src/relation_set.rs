//! Relation set synchronizer
//!
//! A `RelationSet` holds the desired membership of one many-to-many property
//! of one parent object (e.g. a host's `groups`), together with a snapshot of
//! what is currently persisted. `store` applies only the difference between
//! the two to the join table.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::backend::RelationBackend;
use crate::errors::{RelationError, Result};
use crate::model::{JoinSpec, NewEntity, ObjectType, ParentRef, RelatedEntity, RelationRef};
use crate::render::{render_relation_directive, ConfigRenderer};
use crate::resolver::{resolve_names, ResolutionPolicy};

/// Join-row changes needed to make storage match the current membership
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationDiff {
    /// Names linked in storage but no longer wanted (ascending)
    pub to_delete: Vec<String>,
    /// Names wanted but not yet linked in storage (ascending)
    pub to_add: Vec<String>,
}

impl RelationDiff {
    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_add.is_empty()
    }
}

/// Many-to-many relation between one parent object and a set of related objects
///
/// Invariants:
/// - membership is keyed by each entity's own name, so a name appears once
/// - `stored` reflects exactly what is persisted; it only changes after a
///   successful load or store, and never shares data with `relations`
#[derive(Debug, Clone)]
pub struct RelationSet {
    parent: ParentRef,
    property_name: String,
    related_type: ObjectType,
    join: JoinSpec,
    relations: BTreeMap<String, RelatedEntity>,
    stored: BTreeMap<String, RelatedEntity>,
    modified: bool,
}

impl RelationSet {
    /// Create an empty, unloaded relation set
    pub fn new(parent: ParentRef, property_name: impl Into<String>, related_type: ObjectType) -> Self {
        let join = JoinSpec::between(&parent.object_type, &related_type);
        Self {
            parent,
            property_name: property_name.into(),
            related_type,
            join,
            relations: BTreeMap::new(),
            stored: BTreeMap::new(),
            modified: false,
        }
    }

    /// Create a relation set and populate it from storage
    ///
    /// # Errors
    /// * `Persistence` - If the join query fails
    pub fn load_for_stored_object<B: RelationBackend + ?Sized>(
        parent: ParentRef,
        property_name: impl Into<String>,
        related_type: ObjectType,
        backend: &B,
    ) -> Result<Self> {
        let mut set = Self::new(parent, property_name, related_type);
        set.load(backend)?;
        Ok(set)
    }

    /// Replace membership and baseline with the persisted join rows
    ///
    /// Zero rows is a valid, empty result.
    ///
    /// # Errors
    /// * `Persistence` - If the join query fails; the set is left unchanged
    pub fn load<B: RelationBackend + ?Sized>(&mut self, backend: &B) -> Result<()> {
        let rows = backend.query_join_rows(&self.join, self.parent.id)?;

        self.relations = rows
            .into_iter()
            .map(|row| {
                let entity = RelatedEntity::materialize(&self.related_type.tag, row);
                (entity.name.clone(), entity)
            })
            .collect();
        self.clone_stored();

        tracing::debug!(
            join_table = %self.join.join_table,
            parent_id = self.parent.id,
            member_count = self.relations.len(),
            "loaded relation set"
        );
        Ok(())
    }

    /// Replace the whole desired membership
    ///
    /// Empty names are dropped. If the remaining names equal the current ones
    /// (in any order) nothing happens at all. Otherwise membership is cleared,
    /// the set is marked modified and every reference is added under `policy`.
    ///
    /// # Errors
    /// * `ReferenceNotFound` - If a name does not resolve and policy is `Fail`
    /// * `InvalidReference` - If an entity of another type is given
    /// * `Persistence` - If resolution or autocreation fails
    pub fn set<I, R, B>(&mut self, references: I, policy: ResolutionPolicy, backend: &mut B) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<RelationRef>,
        B: RelationBackend + ?Sized,
    {
        let references: Vec<RelationRef> = references
            .into_iter()
            .map(Into::into)
            .filter(|r| !r.is_empty())
            .collect();

        let mut wanted: Vec<&str> = references.iter().map(RelationRef::name).collect();
        wanted.sort_unstable();
        if self.relations.keys().map(String::as_str).eq(wanted.iter().copied()) {
            return Ok(());
        }

        self.relations.clear();
        self.modified = true;
        if references.is_empty() {
            return Ok(());
        }

        self.add_all(references, policy, backend)
    }

    /// Add a single relation
    ///
    /// Adding a name that is already present is a no-op.
    ///
    /// # Errors
    /// * `ReferenceNotFound` - If the name does not resolve and policy is `Fail`
    /// * `InvalidReference` - If the reference is empty or of another type
    /// * `Persistence` - If resolution or autocreation fails
    pub fn add<R, B>(&mut self, reference: R, policy: ResolutionPolicy, backend: &mut B) -> Result<()>
    where
        R: Into<RelationRef>,
        B: RelationBackend + ?Sized,
    {
        self.add_all(std::iter::once(reference), policy, backend)
    }

    /// Add each reference in order
    ///
    /// All names needing a lookup are resolved with one query up front. Under
    /// `Fail` the first unresolvable name aborts; references before it stay
    /// added.
    ///
    /// # Errors
    /// Same as [`RelationSet::add`].
    pub fn add_all<I, R, B>(&mut self, references: I, policy: ResolutionPolicy, backend: &mut B) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<RelationRef>,
        B: RelationBackend + ?Sized,
    {
        let references: Vec<RelationRef> = references.into_iter().map(Into::into).collect();

        let unresolved: Vec<String> = references
            .iter()
            .filter_map(|r| match r {
                RelationRef::Name(name) if !name.is_empty() && !self.relations.contains_key(name) => {
                    Some(name.clone())
                }
                _ => None,
            })
            .collect();
        let mut resolved = resolve_names(&*backend, &self.related_type, &unresolved)?;

        for reference in references {
            self.add_one(reference, policy, &mut resolved, backend)?;
        }
        Ok(())
    }

    fn add_one<B: RelationBackend + ?Sized>(
        &mut self,
        reference: RelationRef,
        policy: ResolutionPolicy,
        resolved: &mut BTreeMap<String, RelatedEntity>,
        backend: &mut B,
    ) -> Result<()> {
        let name = match reference {
            RelationRef::Entity(entity) => {
                if entity.kind != self.related_type.tag {
                    return Err(RelationError::InvalidReference {
                        reason: format!(
                            "expected a {} object, got {} \"{}\"",
                            self.related_type.tag, entity.kind, entity.name
                        ),
                    });
                }
                if entity.name.is_empty() {
                    return Err(RelationError::InvalidReference {
                        reason: format!("{} object without a name", entity.kind),
                    });
                }
                if !self.relations.contains_key(&entity.name) {
                    self.register(entity);
                }
                return Ok(());
            }
            RelationRef::Name(name) => name,
        };

        if name.is_empty() {
            return Err(RelationError::InvalidReference {
                reason: "empty object name".to_string(),
            });
        }
        if self.relations.contains_key(&name) {
            return Ok(());
        }

        if let Some(entity) = resolved.remove(&name) {
            self.register(entity);
            return Ok(());
        }

        match policy {
            ResolutionPolicy::Fail => Err(RelationError::ReferenceNotFound {
                related_table: self.related_type.table.clone(),
                name,
            }),
            ResolutionPolicy::Ignore => {
                tracing::debug!(
                    related_table = %self.related_type.table,
                    name = %name,
                    "ignoring unresolved relation"
                );
                Ok(())
            }
            ResolutionPolicy::Autocreate => {
                let fields = NewEntity::minimal(name.as_str());
                let id = backend.insert_entity(&self.related_type.table, &fields)?;
                tracing::debug!(
                    related_table = %self.related_type.table,
                    name = %name,
                    id,
                    "autocreated related object"
                );
                self.register(RelatedEntity {
                    id,
                    name,
                    object_type: fields.object_type,
                    kind: self.related_type.tag.clone(),
                });
                Ok(())
            }
        }
    }

    fn register(&mut self, entity: RelatedEntity) {
        self.relations.insert(entity.name.clone(), entity);
        self.modified = true;
    }

    /// Drop a relation by name
    ///
    /// Marks the set modified even when the name was not present.
    pub fn remove(&mut self, name: &str) {
        self.relations.remove(name);
        self.modified = true;
    }

    /// Compare current membership with the persisted baseline
    pub fn diff(&self) -> RelationDiff {
        RelationDiff {
            to_delete: self
                .stored
                .keys()
                .filter(|name| !self.relations.contains_key(*name))
                .cloned()
                .collect(),
            to_add: self
                .relations
                .keys()
                .filter(|name| !self.stored.contains_key(*name))
                .cloned()
                .collect(),
        }
    }

    /// Apply the membership diff to the join table
    ///
    /// Deletes links for names that left, inserts links for names that joined,
    /// and leaves everything else alone. The baseline is refreshed only after
    /// all writes succeeded. The modified flag is not touched.
    ///
    /// No rollback happens here: on error, earlier writes of this call stay
    /// applied unless the caller's transaction discards them.
    ///
    /// # Errors
    /// * `Persistence` - First failing delete or insert, unmodified
    pub fn store<B: RelationBackend + ?Sized>(&mut self, backend: &mut B) -> Result<RelationDiff> {
        let diff = self.diff();

        for entity in self
            .stored
            .values()
            .filter(|e| !self.relations.contains_key(&e.name))
        {
            backend.delete_join_row(&self.join, self.parent.id, entity.id)?;
        }

        for entity in self
            .relations
            .values()
            .filter(|e| !self.stored.contains_key(&e.name))
        {
            backend.insert_join_row(&self.join, self.parent.id, entity.id)?;
        }

        self.clone_stored();

        tracing::debug!(
            join_table = %self.join.join_table,
            parent_id = self.parent.id,
            to_delete_len = diff.to_delete.len(),
            to_add_len = diff.to_add.len(),
            "stored relation set"
        );
        Ok(diff)
    }

    fn clone_stored(&mut self) {
        self.stored = self.relations.clone();
    }

    /// Look up a member by name
    pub fn get(&self, name: &str) -> Option<&RelatedEntity> {
        self.relations.get(name)
    }

    /// Mutable access to a member
    ///
    /// Edits never reach the baseline snapshot. Changing `name` here breaks
    /// the name-key invariant and makes rendering fail.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut RelatedEntity> {
        self.relations.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    /// Members in ascending name order
    pub fn iter(&self) -> impl Iterator<Item = &RelatedEntity> {
        self.relations.values()
    }

    /// Current member names, ascending
    pub fn list_related_names(&self) -> Vec<String> {
        self.relations.keys().cloned().collect()
    }

    /// Names as last loaded or stored, ascending
    pub fn list_original_names(&self) -> Vec<String> {
        self.stored.keys().cloned().collect()
    }

    /// Whether any mutation happened since creation or the last acknowledgment
    pub fn has_been_modified(&self) -> bool {
        self.modified
    }

    /// Reset the modified flag
    pub fn acknowledge_changes(&mut self) {
        self.modified = false;
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn parent(&self) -> &ParentRef {
        &self.parent
    }

    pub fn related_type(&self) -> &ObjectType {
        &self.related_type
    }

    /// Short type name of the owning object (e.g. `host`)
    pub fn parent_type_name(&self) -> &str {
        self.parent.type_name()
    }

    pub fn join_spec(&self) -> &JoinSpec {
        &self.join
    }
}

impl<'a> IntoIterator for &'a RelationSet {
    type Item = &'a RelatedEntity;
    type IntoIter = std::collections::btree_map::Values<'a, String, RelatedEntity>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.values()
    }
}

impl ConfigRenderer for RelationSet {
    fn to_config_string(&self) -> Result<String> {
        let rendered = match self.relations.iter().find(|(key, e)| **key != e.name) {
            Some((key, entity)) => Err(RelationError::Render {
                property: self.property_name.clone(),
                reason: format!(
                    "member key \"{}\" does not match object name \"{}\"",
                    key, entity.name
                ),
            }),
            None => {
                let names: Vec<&str> = self.relations.keys().map(String::as_str).collect();
                render_relation_directive(&self.property_name, &names)
            }
        };

        rendered.map_err(|err| {
            tracing::error!(
                property = %self.property_name,
                parent_id = self.parent.id,
                error = %err,
                "failed to render relation directive"
            );
            err
        })
    }
}
