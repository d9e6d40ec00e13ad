//! Query results and result-stream handling.

use crate::database::types::{SqlValue, TypeMapper};
use crate::error::ServerError;
use futures_util::stream::TryStreamExt;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tiberius::{QueryItem, QueryStream};

/// A single row of query results.
///
/// Values keep the column order of the result set and serialize as a JSON
/// object in that same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultRow {
    values: Vec<(String, SqlValue)>,
}

impl ResultRow {
    /// Create a new result row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Append a value.
    pub fn push(&mut self, column: impl Into<String>, value: SqlValue) {
        self.values.push((column.into(), value));
    }

    /// Column/value pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Number of values in the row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Information about a result column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// SQL type name.
    pub sql_type: String,
}

impl ColumnInfo {
    /// Create column info.
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// Rows produced by a result-set statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Columns in order. Empty when the statement produced no result set.
    pub columns: Vec<ColumnInfo>,

    /// Result rows, at most the applied cap.
    pub rows: Vec<ResultRow>,

    /// Whether rows beyond the cap were discarded.
    pub truncated: bool,
}

impl QueryResult {
    /// Create an empty query result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the statement produced a result set at all.
    pub fn has_result_set(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Format the result as CSV.
    pub fn to_csv(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }

        let mut output = String::new();

        let headers: Vec<String> = self.columns.iter().map(|c| csv_field(&c.name)).collect();
        output.push_str(&headers.join(","));
        output.push('\n');

        for row in &self.rows {
            let values: Vec<String> = self
                .columns
                .iter()
                .map(|col| match row.get(&col.name) {
                    Some(SqlValue::Null) | None => String::new(),
                    Some(value) => csv_field(&value.to_display_string()),
                })
                .collect();
            output.push_str(&values.join(","));
            output.push('\n');
        }

        output
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Result of running one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Rows from a result-set statement.
    Rows(QueryResult),
    /// Count reported by a non-query.
    Affected { rows_affected: u64 },
}

/// Collect the first result set of a stream, keeping at most `max_rows` rows.
///
/// The stream is always drained so the connection is ready for the next
/// statement.
pub async fn collect_first_result(
    mut stream: QueryStream<'_>,
    max_rows: usize,
) -> Result<QueryResult, ServerError> {
    let mut result = QueryResult::empty();
    let mut names: Vec<String> = Vec::new();
    let mut result_sets = 0usize;

    while let Some(item) = stream.try_next().await? {
        match item {
            QueryItem::Metadata(meta) => {
                result_sets += 1;
                if result_sets == 1 {
                    result.columns = meta
                        .columns()
                        .iter()
                        .map(|col| ColumnInfo::new(col.name(), TypeMapper::sql_type_name(col)))
                        .collect();
                    names = result.columns.iter().map(|c| c.name.clone()).collect();
                }
            }
            QueryItem::Row(row) => {
                if result_sets > 1 {
                    continue;
                }
                if result.rows.len() >= max_rows {
                    result.truncated = true;
                    continue;
                }
                let values = TypeMapper::extract_row(&row);
                result
                    .rows
                    .push(names.iter().cloned().zip(values).collect());
            }
        }
    }

    Ok(result)
}

/// Truncate a string for logging purposes.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
