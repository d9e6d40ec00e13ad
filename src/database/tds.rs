//! TDS connections to SQL Server through `tiberius`.

use super::connection::{Connector, SqlSession};
use super::query::{collect_first_result, QueryResult};
use crate::config::DatabaseConfig;
use crate::error::{ErrorKind, ServerError};
use async_trait::async_trait;
use std::sync::Arc;
use tiberius::{AuthMethod, Client, Config, EncryptionLevel};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

/// Type alias for a raw tiberius connection.
pub type RawConnection = Client<Compat<TcpStream>>;

/// Create a tiberius Config from DatabaseConfig.
pub fn create_config(db_config: &DatabaseConfig) -> Config {
    let mut config = Config::new();

    config.host(&db_config.host);
    config.port(db_config.port);
    config.database(&db_config.database);
    config.authentication(AuthMethod::sql_server(&db_config.user, &db_config.password));

    if db_config.encrypt {
        config.encryption(EncryptionLevel::Required);
    } else {
        config.encryption(EncryptionLevel::Off);
    }

    // Trust server certificate if requested
    if db_config.trust_server_certificate {
        config.trust_cert();
    }

    config.application_name(&db_config.application_name);

    config
}

/// Opens sessions over TCP, bounded by the login timeout.
pub struct TdsConnector {
    config: Arc<DatabaseConfig>,
}

impl TdsConnector {
    /// Create a connector for the given database.
    pub fn new(config: Arc<DatabaseConfig>) -> Self {
        Self { config }
    }

    async fn open(&self) -> Result<RawConnection, ServerError> {
        let address = self.config.address();
        debug!("Creating connection to {}", address);

        let tcp = TcpStream::connect(&address).await.map_err(|e| {
            ServerError::connection_with_source(format!("Failed to connect to {}: {}", address, e), e)
        })?;

        tcp.set_nodelay(true)
            .map_err(|e| ServerError::connection(format!("Failed to set TCP_NODELAY: {}", e)))?;

        // Perform TDS handshake
        let client = Client::connect(create_config(&self.config), tcp.compat_write())
            .await
            .map_err(login_error)?;

        debug!("Connection established successfully");
        Ok(client)
    }
}

/// Login failures are connection failures whatever the server reported.
fn login_error(e: tiberius::error::Error) -> ServerError {
    let mapped = ServerError::from(e);
    if mapped.kind() == ErrorKind::Connection {
        mapped
    } else {
        ServerError::connection(format!("Login failed: {}", mapped))
    }
}

#[async_trait]
impl Connector for TdsConnector {
    async fn connect(&self) -> Result<Box<dyn SqlSession>, ServerError> {
        let login_timeout = self.config.login_timeout;
        let client = tokio::time::timeout(login_timeout, self.open())
            .await
            .map_err(|_| {
                ServerError::connection(format!(
                    "Login to {} timed out after {} seconds",
                    self.config.address(),
                    login_timeout.as_secs()
                ))
            })??;

        Ok(Box::new(TdsSession { client }))
    }
}

/// A live tiberius client.
pub struct TdsSession {
    client: RawConnection,
}

#[async_trait]
impl SqlSession for TdsSession {
    async fn query(&mut self, sql: &str, max_rows: usize) -> Result<QueryResult, ServerError> {
        let stream = self.client.simple_query(sql).await?;
        collect_first_result(stream, max_rows).await
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, ServerError> {
        let result = self.client.execute(sql, &[]).await?;
        Ok(result.rows_affected().iter().sum())
    }

    async fn close(self: Box<Self>) -> Result<(), ServerError> {
        self.client.close().await.map_err(ServerError::from)
    }
}
