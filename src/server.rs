//! MCP server struct definition and initialization.

use crate::config::Config;
use crate::database::{ConnectionManager, Connector, TdsConnector};
use crate::dispatcher::Dispatcher;
use crate::error::ServerError;
use rmcp::handler::server::router::tool::ToolRouter;
use std::sync::Arc;
use tracing::info;

/// The MSSQL tool adapter instance.
///
/// This struct is cloned for each request, but the inner state is shared via
/// Arc. It exposes three tools and one resource per table.
#[derive(Clone)]
pub struct MssqlAdapterServer {
    /// Configuration.
    pub(crate) config: Arc<Config>,

    /// Dispatcher over the single database session.
    pub(crate) dispatcher: Dispatcher,

    /// Tool router for dispatching tool calls.
    pub(crate) tool_router: ToolRouter<Self>,
}

impl MssqlAdapterServer {
    /// Create a server that connects to SQL Server over TDS.
    ///
    /// No connection is made here; the session opens on the first request.
    pub fn new(config: Config) -> Self {
        let connector = TdsConnector::new(Arc::new(config.database.clone()));
        Self::with_connector(config, Box::new(connector))
    }

    /// Create a server over any session source.
    pub fn with_connector(config: Config, connector: Box<dyn Connector>) -> Self {
        let connections = Arc::new(ConnectionManager::new(
            connector,
            config.database.connection_timeout,
        ));
        let dispatcher = Dispatcher::new(connections, config.limits);

        Self {
            config: Arc::new(config),
            dispatcher,
            tool_router: crate::tools::create_tool_router(),
        }
    }

    /// Create a server from environment variables.
    pub fn from_env() -> Result<Self, ServerError> {
        let config = Config::from_env()?;
        Ok(Self::new(config))
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a reference to the dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Close the database session, if one is open.
    pub async fn shutdown(&self) {
        info!("Closing database session");
        self.dispatcher.connections().close().await;
    }
}
