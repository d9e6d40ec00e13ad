//! ServerHandler implementation for the MSSQL tool adapter.
//!
//! This module implements the rmcp `ServerHandler` trait which defines how
//! the server responds to MCP protocol requests.

use crate::resources::{build_resource_list, read_resource};
use crate::server::MssqlAdapterServer;
use rmcp::handler::server::ServerHandler;
use rmcp::model::{
    Implementation, ListResourcesResult, PaginatedRequestParam, ProtocolVersion,
    ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool_handler, ErrorData};
use tracing::info;

/// The `#[tool_handler]` macro wires up tool routing automatically.
/// It generates the `list_tools` and `call_tool` method implementations.
#[tool_handler]
impl ServerHandler for MssqlAdapterServer {
    /// Server identification - called during initialization handshake.
    fn get_info(&self) -> ServerInfo {
        info!("MCP client requesting server info");

        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,

            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),

            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                title: Some("MSSQL Tool Adapter".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },

            instructions: Some(build_instructions(self)),
        }
    }

    /// List one resource per table.
    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        let resources = build_resource_list(self).await;
        Ok(ListResourcesResult::with_all_items(resources))
    }

    /// Read a table resource.
    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        read_resource(self, &request.uri).await.map_err(ErrorData::from)
    }
}

/// Build server instructions.
fn build_instructions(server: &MssqlAdapterServer) -> String {
    let mut instructions = String::new();

    instructions.push_str("# MSSQL Tool Adapter\n\n");
    instructions.push_str(&format!(
        "Connected to database `{}` on `{}`.\n\n",
        server.config.database.database, server.config.database.host
    ));

    instructions.push_str("## Tools\n");
    instructions.push_str("- `list_tables`: base tables in the database\n");
    instructions.push_str(&format!(
        "- `read_table`: first {} rows of a table\n",
        server.config.limits.read_table_rows
    ));
    instructions.push_str(&format!(
        "- `execute_sql`: run any SQL statement (results capped at {} rows)\n\n",
        server.config.limits.max_result_rows
    ));

    instructions.push_str("## Resources\n");
    instructions.push_str("- `mssql://{table}/data`: table rows as CSV\n\n");

    instructions.push_str(
        "SQL passed to `execute_sql` is not filtered. The database login's \
         permissions are the only limit on what it can do.\n",
    );

    instructions
}
