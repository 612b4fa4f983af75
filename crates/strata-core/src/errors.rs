//! Structured error facility for Strata
//!
//! Every failure carries a stable kind code plus optional operation and
//! message context, so callers can branch programmatically and logs stay
//! diagnosable without row-level data.

/// Result type alias using StrataError
pub type Result<T> = std::result::Result<T, StrataError>;

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code usable in tests and by callers
/// deciding whether a failed batch is worth re-running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    // Validation
    InvalidInput,
    /// A submitted batch contains two entities with the same key hash
    DuplicateKey,
    /// A hydrated row is missing a column the record type requires
    MissingColumn,
    NotFound,

    // Write-path integrity
    /// Read-back after commit disagrees with the submitted batch; a logic or
    /// schema bug, never retried
    Consistency,

    // Storage
    Persistence,
    /// The database was busy or locked; the whole batch is safe to retry
    Busy,
    Io,
    Serialization,

    // Internal
    Internal,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ErrorKind::MissingColumn => "ERR_MISSING_COLUMN",
            ErrorKind::NotFound => "ERR_NOT_FOUND",
            ErrorKind::Consistency => "ERR_CONSISTENCY",
            ErrorKind::Persistence => "ERR_PERSISTENCE",
            ErrorKind::Busy => "ERR_BUSY",
            ErrorKind::Io => "ERR_IO",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a failed batch may be resubmitted as-is
    ///
    /// Transaction atomicity guarantees no partial state survives a failed
    /// batch, so transient storage failures are safe to retry from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Busy | ErrorKind::Io)
    }
}

/// Canonical structured error type
#[derive(Debug, Clone)]
pub struct StrataError {
    kind: ErrorKind,
    op: Option<String>,
    table: Option<String>,
    message: String,
}

impl StrataError {
    /// Create a new error with the specified kind
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            op: None,
            table: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity table context
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
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

    /// Get the entity table context, if any
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the failed operation may be retried as-is
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

impl std::fmt::Display for StrataError {
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
        Ok(())
    }
}

impl std::error::Error for StrataError {}
