//! Persistence collaborator interface
//!
//! The relation set never runs SQL itself. It issues these abstract reads and
//! writes and consumes their results; transactions, retries and timeouts are
//! the implementor's business.

pub mod memory;

pub use memory::{BackendCall, BackendOp, MemoryBackend};

use crate::errors::ExError;
use crate::model::{EntityRow, JoinSpec, NewEntity};

/// Storage operations needed to load, resolve and store relation sets
#[allow(clippy::result_large_err)]
pub trait RelationBackend {
    /// Related rows linked to `parent_id`, ordered by object name ascending
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the query fails.
    fn query_join_rows(&self, join: &JoinSpec, parent_id: i64) -> Result<Vec<EntityRow>, ExError>;

    /// Rows of `related_table` whose object name equals one of `names`
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the query fails.
    fn query_by_names(&self, related_table: &str, names: &[String])
        -> Result<Vec<EntityRow>, ExError>;

    /// Remove the link between `parent_id` and `related_id`
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the delete fails.
    fn delete_join_row(
        &mut self,
        join: &JoinSpec,
        parent_id: i64,
        related_id: i64,
    ) -> Result<(), ExError>;

    /// Link `parent_id` to `related_id`
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the insert fails.
    fn insert_join_row(
        &mut self,
        join: &JoinSpec,
        parent_id: i64,
        related_id: i64,
    ) -> Result<(), ExError>;

    /// Persist a new related entity, returning its id
    ///
    /// # Errors
    ///
    /// Returns `ExErrorKind::Persistence` if the insert fails.
    fn insert_entity(&mut self, related_table: &str, fields: &NewEntity) -> Result<i64, ExError>;
}
