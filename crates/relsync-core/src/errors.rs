use thiserror::Error;

/// Result type alias using RelationError
pub type Result<T> = std::result::Result<T, RelationError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and operator-facing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Resolution
    ReferenceNotFound,
    InvalidReference,

    // Configuration
    UnknownObjectType,
    InvalidIdentifier,
    InvalidInput,

    // Rendering
    Render,

    // Integration/IO
    Persistence,
    Migration,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::ReferenceNotFound => "ERR_REFERENCE_NOT_FOUND",
            ExErrorKind::InvalidReference => "ERR_INVALID_REFERENCE",
            ExErrorKind::UnknownObjectType => "ERR_UNKNOWN_OBJECT_TYPE",
            ExErrorKind::InvalidIdentifier => "ERR_INVALID_IDENTIFIER",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Render => "ERR_RENDER",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Migration => "ERR_MIGRATION",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional context (operation, table,
/// object name) for debugging and operator-facing messages.
#[derive(Debug, Clone, PartialEq)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    table: Option<String>,
    name: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            name: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add object name context
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the object name context, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(table) = &self.table {
            write!(f, " (table: {})", table)?;
        }
        if let Some(name) = &self.name {
            write!(f, " (name: {})", name)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for relation set operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelationError {
    /// A named relation does not exist in the related table
    #[error("The related {related_table} \"{name}\" doesn't exist")]
    ReferenceNotFound { related_table: String, name: String },

    /// Value is neither a name nor an entity of the expected type
    #[error("Invalid related object: {reason}")]
    InvalidReference { reason: String },

    /// Registry has no entry for the requested object type tag
    #[error("Unknown object type: {tag}")]
    UnknownObjectType { tag: String },

    /// Table, column or tag is not a plain SQL identifier
    #[error("Invalid identifier: {identifier:?}")]
    InvalidIdentifier { identifier: String },

    /// Unparseable configuration input
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Config directive could not be produced
    #[error("Cannot render property {property}: {reason}")]
    Render { property: String, reason: String },

    /// Failure reported by the persistence collaborator, carried unmodified
    #[error(transparent)]
    Persistence(#[from] ExError),
}

impl RelationError {
    /// Get the canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            RelationError::ReferenceNotFound { .. } => ExErrorKind::ReferenceNotFound,
            RelationError::InvalidReference { .. } => ExErrorKind::InvalidReference,
            RelationError::UnknownObjectType { .. } => ExErrorKind::UnknownObjectType,
            RelationError::InvalidIdentifier { .. } => ExErrorKind::InvalidIdentifier,
            RelationError::InvalidInput { .. } => ExErrorKind::InvalidInput,
            RelationError::Render { .. } => ExErrorKind::Render,
            RelationError::Persistence(err) => err.kind(),
        }
    }
}

/// Conversion from RelationError to ExError
///
/// Persistence errors pass through untouched so the storage diagnostic
/// reaches the caller as-is.
impl From<RelationError> for ExError {
    fn from(err: RelationError) -> Self {
        match err {
            RelationError::ReferenceNotFound {
                related_table,
                name,
            } => ExError::new(ExErrorKind::ReferenceNotFound)
                .with_table(related_table)
                .with_name(name)
                .with_message("Related object doesn't exist"),

            RelationError::InvalidReference { reason } => {
                ExError::new(ExErrorKind::InvalidReference).with_message(reason)
            }

            RelationError::UnknownObjectType { tag } => ExError::new(ExErrorKind::UnknownObjectType)
                .with_name(tag)
                .with_message("Unknown object type"),

            RelationError::InvalidIdentifier { identifier } => {
                ExError::new(ExErrorKind::InvalidIdentifier)
                    .with_name(identifier)
                    .with_message("Not a valid SQL identifier")
            }

            RelationError::InvalidInput { reason } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(reason)
            }

            RelationError::Render { property, reason } => ExError::new(ExErrorKind::Render)
                .with_op("to_config_string")
                .with_name(property)
                .with_message(reason),

            RelationError::Persistence(err) => err,
        }
    }
}
