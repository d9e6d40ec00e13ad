//! Centralized constants for the MSSQL tool adapter.
//!
//! Default values and limits used throughout the codebase live here so they
//! are easy to find and change.

// =============================================================================
// Connection Defaults
// =============================================================================

/// Default ODBC driver name recorded in the configuration.
pub const DEFAULT_DRIVER: &str = "ODBC Driver 18 for SQL Server";

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Trust the server certificate unless told otherwise.
pub const DEFAULT_TRUST_SERVER_CERTIFICATE: bool = true;

/// Encryption is off unless told otherwise.
pub const DEFAULT_ENCRYPT: bool = false;

/// Default login timeout in seconds.
pub const DEFAULT_LOGIN_TIMEOUT_SECS: u64 = 60;

/// Default connection (statement) timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 60;

/// Application name reported to SQL Server.
pub const APPLICATION_NAME: &str = "mssql-tool-adapter";

// =============================================================================
// Result Size Constants
// =============================================================================

/// Default maximum rows returned by `execute_sql`.
pub const DEFAULT_MAX_RESULT_ROWS: usize = 1_000;

/// Default maximum rows returned by `read_table` and table resources.
pub const DEFAULT_READ_TABLE_ROWS: usize = 100;

/// Maximum length of a SQL Server identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

// =============================================================================
// Resource Constants
// =============================================================================

/// URI scheme for table resources.
pub const RESOURCE_SCHEME: &str = "mssql://";

// =============================================================================
// Logging Constants
// =============================================================================

/// Default truncation length for query logging.
pub const LOG_QUERY_TRUNCATE_LENGTH: usize = 100;
