use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use super::RelationBackend;
use crate::errors::{ExError, ExErrorKind};
use crate::model::{EntityRow, JoinSpec, NewEntity};

/// Operation kinds of the persistence collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendOp {
    QueryJoinRows,
    QueryByNames,
    DeleteJoinRow,
    InsertJoinRow,
    InsertEntity,
}

impl BackendOp {
    fn name(&self) -> &'static str {
        match self {
            BackendOp::QueryJoinRows => "query_join_rows",
            BackendOp::QueryByNames => "query_by_names",
            BackendOp::DeleteJoinRow => "delete_join_row",
            BackendOp::InsertJoinRow => "insert_join_row",
            BackendOp::InsertEntity => "insert_entity",
        }
    }
}

/// One recorded call against a `MemoryBackend`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    QueryJoinRows {
        join_table: String,
        parent_id: i64,
    },
    QueryByNames {
        related_table: String,
        names: Vec<String>,
    },
    DeleteJoinRow {
        join_table: String,
        parent_id: i64,
        related_id: i64,
    },
    InsertJoinRow {
        join_table: String,
        parent_id: i64,
        related_id: i64,
    },
    InsertEntity {
        related_table: String,
        object_name: String,
    },
}

impl BackendCall {
    pub fn op(&self) -> BackendOp {
        match self {
            BackendCall::QueryJoinRows { .. } => BackendOp::QueryJoinRows,
            BackendCall::QueryByNames { .. } => BackendOp::QueryByNames,
            BackendCall::DeleteJoinRow { .. } => BackendOp::DeleteJoinRow,
            BackendCall::InsertJoinRow { .. } => BackendOp::InsertJoinRow,
            BackendCall::InsertEntity { .. } => BackendOp::InsertEntity,
        }
    }
}

/// In-memory persistence backend
///
/// Object tables map id to row, join tables hold `(parent_id, related_id)`
/// pairs. Every call is recorded so callers can assert exactly which I/O a
/// relation set performed. Not thread-safe; designed for single-threaded use.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: BTreeMap<String, BTreeMap<i64, EntityRow>>,
    joins: BTreeMap<String, BTreeSet<(i64, i64)>>,
    next_id: i64,
    failing: HashSet<BackendOp>,
    calls: RefCell<Vec<BackendCall>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity row directly (not recorded), returning its id
    pub fn seed_entity(&mut self, table: &str, name: &str) -> i64 {
        self.next_id += 1;
        let id = self.next_id;
        self.tables.entry(table.to_string()).or_default().insert(
            id,
            EntityRow {
                id,
                object_name: name.to_string(),
                object_type: "object".to_string(),
            },
        );
        id
    }

    /// Insert a join row directly (not recorded)
    pub fn seed_link(&mut self, join_table: &str, parent_id: i64, related_id: i64) {
        self.joins
            .entry(join_table.to_string())
            .or_default()
            .insert((parent_id, related_id));
    }

    /// Make every subsequent call of `op` fail with a persistence error
    pub fn fail_on(&mut self, op: BackendOp) {
        self.failing.insert(op);
    }

    /// Stop injecting failures
    pub fn clear_failures(&mut self) {
        self.failing.clear();
    }

    /// All `(parent_id, related_id)` pairs in a join table
    pub fn join_rows(&self, join_table: &str) -> Vec<(i64, i64)> {
        self.joins
            .get(join_table)
            .map(|rows| rows.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Row of `table` with the given object name
    pub fn find_entity(&self, table: &str, name: &str) -> Option<EntityRow> {
        self.tables
            .get(table)?
            .values()
            .find(|row| row.object_name == name)
            .cloned()
    }

    /// Calls recorded so far, oldest first
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.borrow().clone()
    }

    /// Number of recorded calls of one kind
    pub fn count(&self, op: BackendOp) -> usize {
        self.calls.borrow().iter().filter(|c| c.op() == op).count()
    }

    /// Number of recorded writes (deletes, inserts, entity inserts)
    pub fn write_count(&self) -> usize {
        self.count(BackendOp::DeleteJoinRow)
            + self.count(BackendOp::InsertJoinRow)
            + self.count(BackendOp::InsertEntity)
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: BackendCall) -> Result<(), ExError> {
        let op = call.op();
        self.calls.borrow_mut().push(call);
        if self.failing.contains(&op) {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op(op.name())
                .with_message("injected failure"));
        }
        Ok(())
    }
}

impl RelationBackend for MemoryBackend {
    fn query_join_rows(&self, join: &JoinSpec, parent_id: i64) -> Result<Vec<EntityRow>, ExError> {
        self.record(BackendCall::QueryJoinRows {
            join_table: join.join_table.clone(),
            parent_id,
        })?;

        let (Some(links), Some(related)) = (
            self.joins.get(&join.join_table),
            self.tables.get(&join.related_table),
        ) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<EntityRow> = links
            .iter()
            .filter(|(p, _)| *p == parent_id)
            .filter_map(|(_, r)| related.get(r).cloned())
            .collect();
        rows.sort_by(|a, b| a.object_name.cmp(&b.object_name));
        Ok(rows)
    }

    fn query_by_names(
        &self,
        related_table: &str,
        names: &[String],
    ) -> Result<Vec<EntityRow>, ExError> {
        self.record(BackendCall::QueryByNames {
            related_table: related_table.to_string(),
            names: names.to_vec(),
        })?;

        Ok(self
            .tables
            .get(related_table)
            .map(|rows| {
                rows.values()
                    .filter(|row| names.contains(&row.object_name))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete_join_row(
        &mut self,
        join: &JoinSpec,
        parent_id: i64,
        related_id: i64,
    ) -> Result<(), ExError> {
        self.record(BackendCall::DeleteJoinRow {
            join_table: join.join_table.clone(),
            parent_id,
            related_id,
        })?;

        if let Some(rows) = self.joins.get_mut(&join.join_table) {
            rows.remove(&(parent_id, related_id));
        }
        Ok(())
    }

    fn insert_join_row(
        &mut self,
        join: &JoinSpec,
        parent_id: i64,
        related_id: i64,
    ) -> Result<(), ExError> {
        self.record(BackendCall::InsertJoinRow {
            join_table: join.join_table.clone(),
            parent_id,
            related_id,
        })?;

        let inserted = self
            .joins
            .entry(join.join_table.clone())
            .or_default()
            .insert((parent_id, related_id));
        if !inserted {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("insert_join_row")
                .with_table(join.join_table.clone())
                .with_message(format!(
                    "duplicate join row ({}, {})",
                    parent_id, related_id
                )));
        }
        Ok(())
    }

    fn insert_entity(&mut self, related_table: &str, fields: &NewEntity) -> Result<i64, ExError> {
        self.record(BackendCall::InsertEntity {
            related_table: related_table.to_string(),
            object_name: fields.object_name.clone(),
        })?;

        if self.find_entity(related_table, &fields.object_name).is_some() {
            return Err(ExError::new(ExErrorKind::Persistence)
                .with_op("insert_entity")
                .with_table(related_table)
                .with_name(fields.object_name.clone())
                .with_message("object name already exists"));
        }

        self.next_id += 1;
        let id = self.next_id;
        self.tables.entry(related_table.to_string()).or_default().insert(
            id,
            EntityRow {
                id,
                object_name: fields.object_name.clone(),
                object_type: fields.object_type.clone(),
            },
        );
        Ok(id)
    }
}
