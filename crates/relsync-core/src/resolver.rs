//! Related-entity resolution.
//!
//! Turns relation names into concrete related entities with one batched
//! lookup, and defines the policy applied when a name does not resolve.

use std::collections::BTreeMap;

use crate::backend::RelationBackend;
use crate::errors::{RelationError, Result};
use crate::model::{ObjectType, RelatedEntity};

/// What to do when a named relation does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Fail with `ReferenceNotFound`.
    #[default]
    Fail,
    /// Skip the reference silently.
    Ignore,
    /// Create a minimal related object with that name and use it.
    Autocreate,
}

impl ResolutionPolicy {
    /// Parse from string (`fail`, `ignore`, `autocreate`).
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for any other value.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "fail" => Ok(ResolutionPolicy::Fail),
            "ignore" => Ok(ResolutionPolicy::Ignore),
            "autocreate" => Ok(ResolutionPolicy::Autocreate),
            other => Err(RelationError::InvalidInput {
                reason: format!("unknown resolution policy '{}'", other),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPolicy::Fail => "fail",
            ResolutionPolicy::Ignore => "ignore",
            ResolutionPolicy::Autocreate => "autocreate",
        }
    }
}

/// Resolve `names` against `related`'s table in a single query.
///
/// Matching is exact and case-sensitive. Names that do not exist are simply
/// absent from the result; applying a policy is the caller's job. An empty
/// input issues no query.
///
/// # Errors
///
/// Propagates the backend's error unmodified.
pub fn resolve_names<B: RelationBackend + ?Sized>(
    backend: &B,
    related: &ObjectType,
    names: &[String],
) -> Result<BTreeMap<String, RelatedEntity>> {
    let mut wanted: Vec<String> = names.to_vec();
    wanted.sort_unstable();
    wanted.dedup();
    if wanted.is_empty() {
        return Ok(BTreeMap::new());
    }

    let rows = backend.query_by_names(&related.table, &wanted)?;
    tracing::debug!(
        related_table = %related.table,
        requested = wanted.len(),
        found = rows.len(),
        "resolved relation names"
    );

    Ok(rows
        .into_iter()
        .filter(|row| wanted.binary_search(&row.object_name).is_ok())
        .map(|row| {
            let entity = RelatedEntity::materialize(&related.tag, row);
            (entity.name.clone(), entity)
        })
        .collect())
}
