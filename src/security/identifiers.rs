//! SQL Server identifier validation and escaping.
//!
//! Table names accepted from callers must match `[A-Za-z0-9_]+`, optionally
//! schema-qualified as `schema.table`. Valid names are then quoted with
//! bracket notation before interpolation.

use crate::constants::MAX_IDENTIFIER_LENGTH;
use crate::error::ServerError;
use once_cell::sync::Lazy;
use regex::Regex;

/// Letters, digits and underscore only.
static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$")
        .unwrap_or_else(|e| panic!("Internal error: invalid identifier pattern: {}", e))
});

/// Validate a table name, returning its `(schema, table)` parts.
///
/// ```
/// use mssql_tool_adapter::security::validate_table_name;
///
/// assert_eq!(validate_table_name("Users").unwrap(), (None, "Users"));
/// assert_eq!(validate_table_name("dbo.Users").unwrap(), (Some("dbo"), "Users"));
/// assert!(validate_table_name("Users; DROP TABLE Users").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<(Option<&str>, &str), ServerError> {
    if name.is_empty() {
        return Err(ServerError::validation("Table name cannot be empty"));
    }

    match name.split_once('.') {
        Some((schema, table)) => {
            validate_part(name, schema)?;
            validate_part(name, table)?;
            Ok((Some(schema), table))
        }
        None => {
            validate_part(name, name)?;
            Ok((None, name))
        }
    }
}

fn validate_part(full: &str, part: &str) -> Result<(), ServerError> {
    if part.is_empty() {
        return Err(ServerError::validation(format!(
            "Invalid table name '{}': empty name component",
            full
        )));
    }

    if part.len() > MAX_IDENTIFIER_LENGTH {
        return Err(ServerError::validation(format!(
            "Identifier exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LENGTH
        )));
    }

    if !IDENTIFIER_PATTERN.is_match(part) {
        return Err(ServerError::validation(format!(
            "Invalid table name '{}': only letters, digits and underscores are allowed",
            full
        )));
    }

    Ok(())
}

/// Escape a single identifier using bracket notation.
///
/// Embedded right brackets are doubled.
pub fn escape_identifier(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// Validate a table name and return it bracket-quoted, ready to interpolate.
pub fn safe_table_name(name: &str) -> Result<String, ServerError> {
    let (schema, table) = validate_table_name(name)?;
    Ok(match schema {
        Some(schema) => format!("{}.{}", escape_identifier(schema), escape_identifier(table)),
        None => escape_identifier(table),
    })
}
