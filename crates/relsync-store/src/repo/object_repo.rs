//! Parent object persistence

#![allow(clippy::result_large_err)]

use crate::errors::{sqlite_op_error, Result};
use relsync_core::model::{ObjectType, DEFAULT_OBJECT_TYPE};
use rusqlite::{Connection, OptionalExtension};

/// Create and look up configuration objects by name
pub struct ObjectRepo;

impl ObjectRepo {
    /// Insert an object of the given type, returning its id
    pub fn insert_object(conn: &Connection, object_type: &ObjectType, name: &str) -> Result<i64> {
        let sql = format!(
            "INSERT INTO {} (object_name, object_type) VALUES (?1, ?2)",
            object_type.table
        );
        conn.execute(&sql, rusqlite::params![name, DEFAULT_OBJECT_TYPE])
            .map_err(|e| sqlite_op_error("insert_object", &object_type.table, e))?;

        Ok(conn.last_insert_rowid())
    }

    /// Find an object's id by name
    pub fn find_object_id(
        conn: &Connection,
        object_type: &ObjectType,
        name: &str,
    ) -> Result<Option<i64>> {
        let sql = format!(
            "SELECT id FROM {} WHERE object_name = ?1",
            object_type.table
        );
        conn.query_row(&sql, [name], |row| row.get(0))
            .optional()
            .map_err(|e| sqlite_op_error("find_object_id", &object_type.table, e))
    }
}
