//! MCP tools for SQL Server operations.
//!
//! - `list_tables`: Base tables in the configured database
//! - `read_table`: Leading rows of one table
//! - `execute_sql`: Arbitrary SQL, run verbatim
//!
//! Failures are returned as tool results flagged `isError` carrying an
//! `{"error": {"kind", "message"}}` payload. Only malformed arguments are
//! rejected at the protocol level.

mod inputs;

pub use inputs::*;

use crate::response::{respond, Reply};
use crate::server::MssqlAdapterServer;
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::{tool, tool_router, ErrorData};
use tracing::{debug, warn};

/// Build the router for every tool below.
pub(crate) fn create_tool_router() -> ToolRouter<MssqlAdapterServer> {
    MssqlAdapterServer::tool_router()
}

#[tool_router]
impl MssqlAdapterServer {
    /// List the base tables of the configured database.
    #[tool(description = "List the base tables in the configured SQL Server database. Returns {\"tables\": [...], \"count\": n}.")]
    pub async fn list_tables(&self) -> Result<CallToolResult, ErrorData> {
        debug!("Listing tables");

        let result = self.dispatcher.list_tables().await.map(Reply::Tables);
        if let Err(e) = &result {
            warn!("list_tables failed: {}", e);
        }
        respond(result)
    }

    /// Read the first rows of a table.
    #[tool(description = "Read the first rows of a table (100 by default). The table name may contain only letters, digits and underscores, optionally schema-qualified as schema.table. Returns columns, rows, row_count and a truncated flag.")]
    pub async fn read_table(
        &self,
        Parameters(input): Parameters<ReadTableInput>,
    ) -> Result<CallToolResult, ErrorData> {
        debug!("Reading table {}", input.table);

        let result = self.dispatcher.read_table(&input.table).await.map(Reply::Rows);
        if let Err(e) = &result {
            warn!("read_table '{}' failed: {}", input.table, e);
        }
        respond(result)
    }

    /// Execute caller SQL.
    #[tool(description = "Execute a SQL statement on SQL Server exactly as given. Queries return columns and rows; single INSERT/UPDATE/DELETE/MERGE statements without OUTPUT and DDL return rows_affected. A batch or procedure call that produces no result set reports rows_affected 0 even if it changed rows. The statement is not filtered: what it may do is limited only by the database login's permissions.")]
    pub async fn execute_sql(
        &self,
        Parameters(input): Parameters<ExecuteSqlInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = self.dispatcher.execute_sql(&input.query).await;
        if let Err(e) = &result {
            warn!("execute_sql failed: {}", e);
        }
        respond(result)
    }
}
