//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Relation identifiers
pub const FIELD_PARENT_TABLE: &str = "parent_table";
pub const FIELD_PARENT_ID: &str = "parent_id";
pub const FIELD_PROPERTY: &str = "property";
pub const FIELD_RELATED_TABLE: &str = "related_table";

// Collection sizes
pub const FIELD_MEMBER_COUNT: &str = "member_count";
pub const FIELD_TO_ADD_LEN: &str = "to_add_len";
pub const FIELD_TO_DELETE_LEN: &str = "to_delete_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
