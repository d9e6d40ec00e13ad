//! MCP resources exposing table contents.
//!
//! ## URI Scheme
//!
//! - `mssql://{table}/data` - first rows of a table as CSV
//!
//! `{table}` follows the same rules as the `read_table` tool.

use crate::constants::RESOURCE_SCHEME;
use crate::error::ServerError;
use crate::security::validate_table_name;
use crate::server::MssqlAdapterServer;
use rmcp::model::{AnnotateAble, RawResource, ReadResourceResult, Resource, ResourceContents};
use tracing::{debug, warn};

/// Build one resource per table. Failures are logged and yield no resources.
pub async fn build_resource_list(server: &MssqlAdapterServer) -> Vec<Resource> {
    match server.dispatcher.list_tables().await {
        Ok(tables) => {
            debug!("Listing {} table resources", tables.len());
            tables
                .iter()
                .map(|table| {
                    create_resource(
                        &table_uri(table),
                        &format!("Table: {}", table),
                        &format!("Data in table: {}", table),
                        "text/plain",
                    )
                })
                .collect()
        }
        Err(e) => {
            warn!("Failed to list resources: {}", e);
            Vec::new()
        }
    }
}

/// Read a table resource as CSV.
pub async fn read_resource(
    server: &MssqlAdapterServer,
    uri: &str,
) -> Result<ReadResourceResult, ServerError> {
    let table = parse_resource_uri(uri).map_err(|e| ServerError::invalid_input(e.to_string()))?;

    let result = server.dispatcher.read_table(table).await?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(result.to_csv(), uri.to_string())],
    })
}

/// Resource URI for a table.
pub fn table_uri(table: &str) -> String {
    format!("{}{}/data", RESOURCE_SCHEME, table)
}

// =========================================================================
// Resource URI Parsing
// =========================================================================

/// Error type for resource URI parsing with detailed context.
#[derive(Debug)]
struct ResourceParseError {
    uri: String,
    reason: ParseErrorReason,
}

/// Specific reasons why a resource URI parse failed.
#[derive(Debug)]
enum ParseErrorReason {
    /// URI does not start with mssql:// scheme
    InvalidScheme,
    /// URI does not end in /data
    UnknownResource,
    /// Invalid table name in the path
    InvalidIdentifier { identifier: String, reason: String },
}

impl std::fmt::Display for ResourceParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid resource URI '{}': ", self.uri)?;
        match &self.reason {
            ParseErrorReason::InvalidScheme => {
                write!(f, "URI must start with '{}' scheme", RESOURCE_SCHEME)
            }
            ParseErrorReason::UnknownResource => {
                write!(f, "expected {}{{table}}/data", RESOURCE_SCHEME)
            }
            ParseErrorReason::InvalidIdentifier { identifier, reason } => {
                write!(f, "invalid table name '{}': {}", identifier, reason)
            }
        }
    }
}

impl std::error::Error for ResourceParseError {}

fn parse_resource_uri(uri: &str) -> Result<&str, ResourceParseError> {
    let fail = |reason: ParseErrorReason| ResourceParseError {
        uri: uri.to_string(),
        reason,
    };

    let path = uri
        .strip_prefix(RESOURCE_SCHEME)
        .ok_or_else(|| fail(ParseErrorReason::InvalidScheme))?;

    let table = path
        .strip_suffix("/data")
        .ok_or_else(|| fail(ParseErrorReason::UnknownResource))?;

    validate_table_name(table).map_err(|e| {
        fail(ParseErrorReason::InvalidIdentifier {
            identifier: table.to_string(),
            reason: e.to_string(),
        })
    })?;

    Ok(table)
}

/// Create a resource definition.
fn create_resource(uri: &str, name: &str, description: &str, mime_type: &str) -> Resource {
    let mut resource = RawResource::new(uri, name);
    resource.description = Some(description.to_string());
    resource.mime_type = Some(mime_type.to_string());
    resource.no_annotation()
}
