//! Error types for the MSSQL tool adapter.
//!
//! Driver failures are mapped into [`ServerError`] at the database boundary.
//! Every variant belongs to exactly one [`ErrorKind`], the closed taxonomy
//! reported to callers.

use rmcp::ErrorData;
use serde::Serialize;
use thiserror::Error;

/// Closed error taxonomy reported in tool responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Missing or invalid environment configuration. Fatal at startup.
    Configuration,
    /// Network, authentication or timeout failure.
    Connection,
    /// The server rejected or failed the statement. The session stays usable.
    Query,
    /// Malformed request payload or invalid identifier. No state change.
    Protocol,
}

impl ErrorKind {
    /// Get the kind name as used in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Connection => "connection",
            ErrorKind::Query => "query",
            ErrorKind::Protocol => "protocol",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain-specific errors for the adapter.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication error
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Database not found or not accessible at login
    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    /// Operation timeout
    #[error("Timeout: operation exceeded {timeout_seconds} seconds")]
    Timeout { timeout_seconds: u64 },

    /// Object not found (table, view, procedure, etc.)
    #[error("{object_type} not found: {name}")]
    ObjectNotFound { object_type: String, name: String },

    /// Permission denied
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Data truncation
    #[error("Data truncation: {0}")]
    DataTruncation(String),

    /// Query execution error
    #[error("Query execution error: {message}")]
    QueryExecution {
        message: String,
        sql_error_code: Option<i32>,
    },

    /// Identifier or input validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Malformed request
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an authentication error.
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a timeout error.
    pub fn timeout(seconds: u64) -> Self {
        Self::Timeout {
            timeout_seconds: seconds,
        }
    }

    /// Create an object not found error.
    pub fn object_not_found(object_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ObjectNotFound {
            object_type: object_type.into(),
            name: name.into(),
        }
    }

    /// Create a permission denied error.
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create a query execution error.
    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a query execution error with the SQL Server error number.
    pub fn query_error_with_code(msg: impl Into<String>, code: i32) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: Some(code),
        }
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationFailed(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// The taxonomy bucket this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Connection { .. }
            | Self::Authentication(_)
            | Self::DatabaseNotFound(_)
            | Self::Timeout { .. } => ErrorKind::Connection,
            Self::ObjectNotFound { .. }
            | Self::PermissionDenied(_)
            | Self::ConstraintViolation(_)
            | Self::DataTruncation(_)
            | Self::QueryExecution { .. } => ErrorKind::Query,
            Self::ValidationFailed(_) | Self::InvalidInput(_) => ErrorKind::Protocol,
        }
    }

    /// Whether the session that produced this error can no longer be used.
    ///
    /// Only transport-level failures qualify. Server-side statement errors
    /// leave the session intact.
    pub fn is_connection_lost(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }

    /// Get a user-friendly suggestion for how to fix this error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Config(_) => Some("Check the adapter's environment variables"),
            Self::Connection { .. } => {
                Some("Check server hostname, port, and network connectivity")
            }
            Self::Authentication(_) => Some("Verify MSSQL_USER and MSSQL_PASSWORD"),
            Self::DatabaseNotFound(_) => {
                Some("Check MSSQL_DATABASE and that the user may open it")
            }
            Self::Timeout { .. } => {
                Some("Try a simpler query or raise ConnectionTimeout / LoginTimeout")
            }
            Self::ObjectNotFound { .. } => Some("Check the object name; list_tables shows what exists"),
            Self::PermissionDenied(_) => {
                Some("Request appropriate permissions from your database administrator")
            }
            Self::ConstraintViolation(_) => {
                Some("Check the constraint definition and your data values")
            }
            Self::ValidationFailed(_) => {
                Some("Table names may contain only letters, digits and underscores")
            }
            _ => None,
        }
    }
}

/// Map SQL Server error numbers to semantic ServerError types.
pub fn from_sql_error(code: i32, message: &str) -> ServerError {
    match code {
        // Authentication errors
        18456 => ServerError::auth(format!("Login failed: {}", message)),

        // Database errors
        4060 => ServerError::DatabaseNotFound(message.to_string()),

        // Object not found errors
        208 => ServerError::object_not_found("Object", message),
        2812 => ServerError::object_not_found("Stored procedure", message),

        // Permission errors
        229 | 230 => ServerError::permission_denied(message),
        262 => ServerError::permission_denied(format!("CREATE permission denied: {}", message)),

        // Constraint violations
        547 => ServerError::ConstraintViolation(message.to_string()),
        2601 | 2627 => ServerError::ConstraintViolation(format!("Duplicate key: {}", message)),

        // Data errors
        8115 => ServerError::query_error_with_code(format!("Arithmetic overflow: {}", message), code),
        8152 => ServerError::DataTruncation(message.to_string()),

        // Syntax errors
        102 => ServerError::query_error_with_code(format!("Syntax error: {}", message), code),

        // Invalid column/object
        207 => ServerError::query_error_with_code(format!("Invalid column: {}", message), code),
        201 => ServerError::query_error_with_code(format!("Invalid object: {}", message), code),

        // Deadlock
        1205 => ServerError::query_error_with_code(
            "Transaction was deadlocked and has been rolled back",
            code,
        ),

        _ => ServerError::query_error_with_code(message, code),
    }
}

impl From<tiberius::error::Error> for ServerError {
    fn from(e: tiberius::error::Error) -> Self {
        use tiberius::error::Error;

        match e {
            Error::Server(token) => from_sql_error(token.code() as i32, token.message()),
            Error::Io { kind, message } => {
                ServerError::connection(format!("IO error ({:?}): {}", kind, message))
            }
            Error::Tls(message) => ServerError::connection(format!("TLS error: {}", message)),
            Error::Protocol(message) => {
                ServerError::connection(format!("Protocol error: {}", message))
            }
            Error::Routing { host, port } => ServerError::connection(format!(
                "Server requested a redirect to {}:{}, which is not supported",
                host, port
            )),
            other => ServerError::query_error(other.to_string()),
        }
    }
}

/// Convert ServerError to rmcp's ErrorData for protocol-level failures.
///
/// Tool handlers report most errors as tool results instead. This conversion
/// is for failures the protocol itself has to carry, like a bad resource URI.
impl From<ServerError> for ErrorData {
    fn from(e: ServerError) -> Self {
        match e.kind() {
            ErrorKind::Protocol => ErrorData::invalid_params(e.to_string(), None),
            _ => ErrorData::internal_error(e.to_string(), None),
        }
    }
}
