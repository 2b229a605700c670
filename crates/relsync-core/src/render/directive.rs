use super::config_helper::{render_array, render_key_value};
use crate::errors::{RelationError, Result};
use crate::model::object_type::ensure_identifier;

/// Anything that can render itself as configuration DSL text
pub trait ConfigRenderer {
    /// Render as configuration text
    ///
    /// # Errors
    ///
    /// Returns `RelationError::Render` if the object is in a state that cannot
    /// be expressed. Callers must not swallow this.
    fn to_config_string(&self) -> Result<String>;
}

/// Render a property bound to an array of member names
///
/// An empty member list renders as the empty string so the directive is
/// omitted altogether. Names are expected in ascending order.
///
/// # Errors
/// * `Render` - If `property` is not a plain identifier
pub fn render_relation_directive<S: AsRef<str>>(property: &str, names: &[S]) -> Result<String> {
    if names.is_empty() {
        return Ok(String::new());
    }

    ensure_identifier(property).map_err(|_| RelationError::Render {
        property: property.to_string(),
        reason: "property name is not a valid attribute identifier".to_string(),
    })?;

    Ok(render_key_value(property, &render_array(names)))
}
