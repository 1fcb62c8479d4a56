use thiserror::Error;

/// Error type for pgidentity operations
#[derive(Debug, Error)]
pub enum PgIdentityError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Expected {expected} row(s), got {actual}")]
    UnexpectedRowCount { expected: usize, actual: usize },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid value for column {column}: {value}")]
    InvalidValue { column: String, value: String },

    #[error("No value bound for parameter @{0}")]
    UnboundParameter(String),

    #[error("Parameter @{0} is bound more than once")]
    DuplicateParameter(String),

    #[error("Extra property {0} collides with a built-in column")]
    ReservedProperty(String),

    #[error("Role {0} does not exist.")]
    RoleNotFound(String),

    #[error("The naming policy has already been set and cannot be changed")]
    NamingPolicyAlreadySet,

    #[error("Operation was cancelled")]
    Cancelled,
}

/// Result type alias for pgidentity operations
pub type Result<T> = std::result::Result<T, PgIdentityError>;
