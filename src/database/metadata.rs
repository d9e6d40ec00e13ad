//! Catalog queries for schema introspection.

use crate::database::query::{QueryResult, ResultRow};
use crate::database::types::SqlValue;
use std::collections::BTreeSet;

/// Base tables visible to the login in the current database.
pub const LIST_TABLES_QUERY: &str =
    "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_TYPE = 'BASE TABLE'";

/// Build the capped read of a table.
///
/// `quoted_table` must already be validated and bracket-quoted.
pub fn read_table_query(quoted_table: &str, max_rows: usize) -> String {
    format!("SELECT TOP ({}) * FROM {}", max_rows, quoted_table)
}

/// Table names from the catalog result, deduplicated and sorted.
///
/// The same name can appear once per schema.
pub fn table_names(result: &QueryResult) -> Vec<String> {
    result
        .rows
        .iter()
        .filter_map(|row| extract_string(row, "TABLE_NAME"))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn extract_string(row: &ResultRow, column: &str) -> Option<String> {
    match row.get(column)? {
        SqlValue::String(s) => Some(s.clone()),
        SqlValue::Null => None,
        other => Some(other.to_display_string()),
    }
}
