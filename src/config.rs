//! Configuration management for the MSSQL tool adapter.
//!
//! Configuration is loaded from environment variables following the 12-factor
//! app pattern. It is validated once at startup and never mutated afterwards.

use crate::constants::{
    APPLICATION_NAME, DEFAULT_CONNECTION_TIMEOUT_SECS, DEFAULT_DRIVER, DEFAULT_ENCRYPT,
    DEFAULT_LOGIN_TIMEOUT_SECS, DEFAULT_MAX_RESULT_ROWS, DEFAULT_PORT, DEFAULT_READ_TABLE_ROWS,
    DEFAULT_TRUST_SERVER_CERTIFICATE,
};
use crate::error::ServerError;
use std::fmt;
use std::time::Duration;

/// Adapter configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection configuration
    pub database: DatabaseConfig,

    /// Result size limits
    pub limits: LimitsConfig,
}

/// Database connection configuration.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// ODBC driver name (informational; the adapter speaks TDS natively)
    pub driver: String,

    /// SQL Server hostname or IP address
    pub host: String,

    /// SQL Server port (default: 1433)
    pub port: u16,

    /// Login name
    pub user: String,

    /// Login password
    pub password: String,

    /// Database to open
    pub database: String,

    /// Trust server certificate (for self-signed certs)
    pub trust_server_certificate: bool,

    /// Enable TLS encryption
    pub encrypt: bool,

    /// Upper bound for TCP connect plus login handshake
    pub login_timeout: Duration,

    /// Upper bound for a single statement
    pub connection_timeout: Duration,

    /// Application name sent to SQL Server
    pub application_name: String,
}

/// Row caps applied to results.
#[derive(Debug, Clone, Copy)]
pub struct LimitsConfig {
    /// Maximum rows returned by `execute_sql`
    pub max_result_rows: usize,

    /// Maximum rows returned by `read_table`
    pub read_table_rows: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_result_rows: DEFAULT_MAX_RESULT_ROWS,
            read_table_rows: DEFAULT_READ_TABLE_ROWS,
        }
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"********")
            .field("database", &self.database)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("encrypt", &self.encrypt)
            .field("login_timeout", &self.login_timeout)
            .field("connection_timeout", &self.connection_timeout)
            .field("application_name", &self.application_name)
            .finish()
    }
}

impl DatabaseConfig {
    /// `host:port` address for the TCP connection.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Connection string with the password masked, for logs.
    pub fn redacted_connection_string(&self) -> String {
        [
            format!("Driver={{{}}}", self.driver),
            format!("Server={},{}", self.host, self.port),
            format!("Database={}", self.database),
            format!("UID={}", self.user),
            "PWD=***".to_string(),
            format!("TrustServerCertificate={}", yes_no(self.trust_server_certificate)),
            format!("Encrypt={}", yes_no(self.encrypt)),
            format!("Connection Timeout={}", self.connection_timeout.as_secs()),
            format!("Login Timeout={}", self.login_timeout.as_secs()),
        ]
        .join(";")
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// ## Required
    /// - `MSSQL_HOST`: SQL Server hostname
    /// - `MSSQL_USER`: SQL Server login
    /// - `MSSQL_PASSWORD`: SQL Server password
    /// - `MSSQL_DATABASE`: Database name
    ///
    /// ## Optional
    /// - `MSSQL_DRIVER`: ODBC driver name (default: ODBC Driver 18 for SQL Server)
    /// - `MSSQL_PORT`: Port number (default: 1433)
    /// - `TrustServerCertificate`: yes/no (default: yes)
    /// - `Encrypt`: yes/no (default: no)
    /// - `LoginTimeout`: Login timeout in seconds (default: 60)
    /// - `ConnectionTimeout`: Statement timeout in seconds (default: 60)
    /// - `MSSQL_MAX_ROWS`: Row cap for `execute_sql` (default: 1000)
    /// - `MSSQL_READ_TABLE_ROWS`: Row cap for `read_table` (default: 100)
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| clean_value(&v))
                .filter(|v| !v.trim().is_empty())
        };
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                ServerError::config(format!("{} environment variable is required", key))
            })
        };

        // Required settings
        let host = required("MSSQL_HOST")?;
        let user = required("MSSQL_USER")?;
        let password = required("MSSQL_PASSWORD")?;
        let database = required("MSSQL_DATABASE")?;

        // Optional settings
        let driver = get("MSSQL_DRIVER").unwrap_or_else(|| DEFAULT_DRIVER.to_string());

        let port = match get("MSSQL_PORT") {
            Some(raw) => parse_number::<u16>("MSSQL_PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ServerError::config("MSSQL_PORT must be between 1 and 65535"));
        }

        let trust_server_certificate = match get("TrustServerCertificate") {
            Some(raw) => parse_flag("TrustServerCertificate", &raw)?,
            None => DEFAULT_TRUST_SERVER_CERTIFICATE,
        };

        let encrypt = match get("Encrypt") {
            Some(raw) => parse_flag("Encrypt", &raw)?,
            None => DEFAULT_ENCRYPT,
        };

        let login_timeout = parse_timeout(get("LoginTimeout"), "LoginTimeout", DEFAULT_LOGIN_TIMEOUT_SECS)?;
        let connection_timeout = parse_timeout(
            get("ConnectionTimeout"),
            "ConnectionTimeout",
            DEFAULT_CONNECTION_TIMEOUT_SECS,
        )?;

        let max_result_rows = parse_row_cap(get("MSSQL_MAX_ROWS"), "MSSQL_MAX_ROWS", DEFAULT_MAX_RESULT_ROWS)?;
        let read_table_rows = parse_row_cap(
            get("MSSQL_READ_TABLE_ROWS"),
            "MSSQL_READ_TABLE_ROWS",
            DEFAULT_READ_TABLE_ROWS,
        )?;

        Ok(Config {
            database: DatabaseConfig {
                driver,
                host,
                port,
                user,
                password,
                database,
                trust_server_certificate,
                encrypt,
                login_timeout,
                connection_timeout,
                application_name: APPLICATION_NAME.to_string(),
            },
            limits: LimitsConfig {
                max_result_rows,
                read_table_rows,
            },
        })
    }
}

/// Strip one pair of matching surrounding quotes.
fn clean_value(raw: &str) -> String {
    let unquoted = if raw.len() >= 2
        && ((raw.starts_with('\'') && raw.ends_with('\''))
            || (raw.starts_with('"') && raw.ends_with('"')))
    {
        &raw[1..raw.len() - 1]
    } else {
        raw
    };
    unquoted.to_string()
}

fn parse_flag(key: &str, raw: &str) -> Result<bool, ServerError> {
    match raw.to_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        _ => Err(ServerError::config(format!(
            "{} must be yes or no, got '{}'",
            key, raw
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ServerError> {
    raw.parse::<T>().map_err(|_| {
        ServerError::config(format!("{} must be a number, got '{}'", key, raw))
    })
}

fn parse_timeout(raw: Option<String>, key: &str, default_secs: u64) -> Result<Duration, ServerError> {
    let secs = match raw {
        Some(raw) => parse_number::<u64>(key, &raw)?,
        None => default_secs,
    };
    if secs == 0 {
        return Err(ServerError::config(format!("{} must be at least 1 second", key)));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_row_cap(raw: Option<String>, key: &str, default: usize) -> Result<usize, ServerError> {
    let rows = match raw {
        Some(raw) => parse_number::<usize>(key, &raw)?,
        None => default,
    };
    if rows == 0 {
        return Err(ServerError::config(format!("{} must be at least 1", key)));
    }
    Ok(rows)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
