//! JSON payloads returned by the tools.
//!
//! Successful results and failures are both tool results; failures are
//! flagged `isError` so the host can carry on with the conversation.

use crate::database::{QueryResult, ResultRow};
use crate::error::{ErrorKind, ServerError};
use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData;
use serde::Serialize;

/// A successful dispatcher result.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Table names, sorted.
    Tables(Vec<String>),
    /// Rows from a result-set statement.
    Rows(QueryResult),
    /// Rows-affected count from a statement without a result set.
    Status { rows_affected: u64 },
}

#[derive(Serialize)]
struct TablesPayload<'a> {
    tables: &'a [String],
    count: usize,
}

#[derive(Serialize)]
struct RowsPayload<'a> {
    columns: Vec<&'a str>,
    rows: &'a [ResultRow],
    row_count: usize,
    truncated: bool,
}

#[derive(Serialize)]
struct StatusPayload {
    rows_affected: u64,
    message: String,
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: ErrorBody<'a>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'a str>,
}

impl Reply {
    /// Render the reply as a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Reply::Tables(names) => serde_json::to_value(TablesPayload {
                tables: names,
                count: names.len(),
            }),
            Reply::Rows(result) => serde_json::to_value(RowsPayload {
                columns: result.columns.iter().map(|c| c.name.as_str()).collect(),
                rows: &result.rows,
                row_count: result.rows.len(),
                truncated: result.truncated,
            }),
            Reply::Status { rows_affected } => serde_json::to_value(StatusPayload {
                rows_affected: *rows_affected,
                message: format!("Query executed successfully. Rows affected: {}", rows_affected),
            }),
        }
    }
}

/// Render an error descriptor as a JSON value.
pub fn error_json(err: &ServerError) -> serde_json::Value {
    let payload = ErrorPayload {
        error: ErrorBody {
            kind: err.kind(),
            message: err.to_string(),
            suggestion: err.suggestion(),
        },
    };
    serde_json::to_value(payload).unwrap_or_else(|_| {
        serde_json::json!({ "error": { "kind": err.kind(), "message": err.to_string() } })
    })
}

/// Wrap a reply as a successful tool result.
pub fn success(reply: &Reply) -> Result<CallToolResult, ErrorData> {
    let json = reply
        .to_json()
        .and_then(|value| serde_json::to_string_pretty(&value))
        .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Wrap an error as a tool result flagged `isError`.
pub fn failure(err: &ServerError) -> CallToolResult {
    let text = serde_json::to_string_pretty(&error_json(err))
        .unwrap_or_else(|_| format!("{{\"error\":{{\"message\":{:?}}}}}", err.to_string()));
    CallToolResult::error(vec![Content::text(text)])
}

/// Turn a dispatcher result into a tool result.
pub fn respond(result: Result<Reply, ServerError>) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(reply) => success(&reply),
        Err(err) => Ok(failure(&err)),
    }
}
