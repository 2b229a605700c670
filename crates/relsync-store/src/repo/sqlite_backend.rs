//! SQLite implementation of `RelationBackend`
//!
//! Table and column names come from validated `ObjectType` descriptors, so
//! they are interpolated into SQL; every value goes through a bound parameter.

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_op_error, Result};
use relsync_core::backend::RelationBackend;
use relsync_core::model::{EntityRow, JoinSpec, NewEntity};
use rusqlite::{params_from_iter, Connection, Row};

/// Most names bound into one `IN (...)` lookup; SQLite caps bound variables
pub const NAME_BATCH_SIZE: usize = 500;

/// Relation backend over a borrowed connection
///
/// Pass a `Transaction` (it derefs to `Connection`) to make a whole
/// load/set/store cycle atomic.
pub struct SqliteBackend<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteBackend<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Underlying connection
    pub fn connection(&self) -> &'c Connection {
        self.conn
    }
}

fn entity_row(row: &Row<'_>) -> rusqlite::Result<EntityRow> {
    Ok(EntityRow {
        id: row.get(0)?,
        object_name: row.get(1)?,
        object_type: row.get(2)?,
    })
}

impl RelationBackend for SqliteBackend<'_> {
    fn query_join_rows(&self, join: &JoinSpec, parent_id: i64) -> Result<Vec<EntityRow>> {
        let sql = format!(
            "SELECT ro.id, ro.object_name, ro.object_type
             FROM {join_table} r
             JOIN {related_table} ro ON r.{related_col} = ro.id
             WHERE r.{parent_col} = ?1
             ORDER BY ro.object_name",
            join_table = join.join_table,
            related_table = join.related_table,
            related_col = join.related_id_column,
            parent_col = join.parent_id_column,
        );
        let on_err = |e: rusqlite::Error| sqlite_op_error("query_join_rows", &join.join_table, e);

        let mut stmt = self.conn.prepare(&sql).map_err(on_err)?;
        let rows = stmt
            .query_map([parent_id], entity_row)
            .map_err(on_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(on_err)?;

        tracing::debug!(
            join_table = %join.join_table,
            parent_id,
            rows = rows.len(),
            "loaded join rows"
        );
        Ok(rows)
    }

    fn query_by_names(&self, related_table: &str, names: &[String]) -> Result<Vec<EntityRow>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let on_err = |e: rusqlite::Error| sqlite_op_error("query_by_names", related_table, e);

        let mut rows = Vec::with_capacity(names.len());
        for chunk in names.chunks(NAME_BATCH_SIZE) {
            let placeholders = (1..=chunk.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "SELECT id, object_name, object_type FROM {} WHERE object_name IN ({})",
                related_table, placeholders
            );

            let mut stmt = self.conn.prepare_cached(&sql).map_err(on_err)?;
            let found = stmt
                .query_map(params_from_iter(chunk.iter()), entity_row)
                .map_err(on_err)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(on_err)?;
            rows.extend(found);
        }

        Ok(rows)
    }

    fn delete_join_row(&mut self, join: &JoinSpec, parent_id: i64, related_id: i64) -> Result<()> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
            join.join_table, join.parent_id_column, join.related_id_column
        );
        self.conn
            .execute(&sql, [parent_id, related_id])
            .map_err(|e| sqlite_op_error("delete_join_row", &join.join_table, e))?;

        Ok(())
    }

    fn insert_join_row(&mut self, join: &JoinSpec, parent_id: i64, related_id: i64) -> Result<()> {
        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
            join.join_table, join.parent_id_column, join.related_id_column
        );
        self.conn
            .execute(&sql, [parent_id, related_id])
            .map_err(|e| sqlite_op_error("insert_join_row", &join.join_table, e))?;

        Ok(())
    }

    fn insert_entity(&mut self, related_table: &str, fields: &NewEntity) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {} (object_name, object_type) VALUES (?1, ?2)",
            related_table
        );
        self.conn
            .execute(
                &sql,
                rusqlite::params![fields.object_name, fields.object_type],
            )
            .map_err(|e| sqlite_op_error("insert_entity", related_table, e))?;

        let id = self.conn.last_insert_rowid();
        tracing::debug!(related_table, id, name = %fields.object_name, "created entity");
        Ok(id)
    }
}
