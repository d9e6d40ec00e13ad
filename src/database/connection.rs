//! Single-session connection management for SQL Server.
//!
//! The adapter holds at most one live session. It is opened lazily, shared
//! behind an async mutex so statements never interleave, and discarded when
//! the transport breaks or a statement times out. A request that finds its
//! session broken gets exactly one reconnect.

use super::query::{QueryOutcome, QueryResult};
use crate::constants::LOG_QUERY_TRUNCATE_LENGTH;
use crate::database::query::truncate_for_log;
use crate::error::ServerError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Opens database sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Open a new session, including the login handshake.
    async fn connect(&self) -> Result<Box<dyn SqlSession>, ServerError>;
}

/// A live database session.
#[async_trait]
pub trait SqlSession: Send {
    /// Run a statement that produces rows, keeping at most `max_rows`.
    async fn query(&mut self, sql: &str, max_rows: usize) -> Result<QueryResult, ServerError>;

    /// Run a statement for its rows-affected count.
    async fn execute(&mut self, sql: &str) -> Result<u64, ServerError>;

    /// Close the session gracefully.
    async fn close(self: Box<Self>) -> Result<(), ServerError> {
        Ok(())
    }
}

/// A statement and how to run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement<'a> {
    /// Result-set statement with a row cap.
    Query { sql: &'a str, max_rows: usize },
    /// Non-query reporting rows affected.
    Execute { sql: &'a str },
}

impl Statement<'_> {
    fn sql(&self) -> &str {
        match self {
            Statement::Query { sql, .. } | Statement::Execute { sql } => sql,
        }
    }
}

#[derive(Default)]
struct SessionSlot {
    session: Option<Box<dyn SqlSession>>,
    /// A previous session was discarded after a failure.
    dropped: bool,
}

/// Owner of the adapter's single database session.
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    slot: Mutex<SessionSlot>,
    statement_timeout: Duration,
}

impl ConnectionManager {
    /// Create a manager. No connection is made until first use.
    pub fn new(connector: Box<dyn Connector>, statement_timeout: Duration) -> Self {
        Self {
            connector,
            slot: Mutex::new(SessionSlot::default()),
            statement_timeout,
        }
    }

    /// Open a session if none is held.
    pub async fn ensure_connected(&self) -> Result<(), ServerError> {
        let mut slot = self.slot.lock().await;
        if slot.session.is_none() {
            self.open(&mut slot).await?;
        }
        Ok(())
    }

    /// Whether a session is currently held.
    pub async fn is_connected(&self) -> bool {
        self.slot.lock().await.session.is_some()
    }

    /// Run a statement on the session, reconnecting at most once.
    ///
    /// Opening a session that replaces a discarded one counts as the
    /// request's reconnect. Timeouts discard the session and are not retried.
    /// Query errors leave the session in place.
    pub async fn run(&self, statement: Statement<'_>) -> Result<QueryOutcome, ServerError> {
        let mut slot = self.slot.lock().await;

        let mut reconnected = false;
        if slot.session.is_none() {
            reconnected = slot.dropped;
            self.open(&mut slot).await?;
        }

        loop {
            let session = slot
                .session
                .as_mut()
                .ok_or_else(|| ServerError::connection("No active session"))?;

            match self.run_on(session.as_mut(), statement).await {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_connection_lost() && !reconnected => {
                    warn!("Session lost, reconnecting once: {}", e);
                    Self::discard(&mut slot);
                    reconnected = true;
                    self.open(&mut slot).await?;
                }
                Err(e) => {
                    if e.is_connection_lost() || matches!(e, ServerError::Timeout { .. }) {
                        warn!("Discarding session: {}", e);
                        Self::discard(&mut slot);
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Close the held session, if any.
    pub async fn close(&self) {
        let mut slot = self.slot.lock().await;
        if let Some(session) = slot.session.take() {
            match session.close().await {
                Ok(()) => info!("Database session closed"),
                Err(e) => debug!("Error while closing session: {}", e),
            }
        }
    }

    async fn open(&self, slot: &mut SessionSlot) -> Result<(), ServerError> {
        let session = self.connector.connect().await?;
        if slot.dropped {
            info!("Reconnected to SQL Server");
        } else {
            info!("Connected to SQL Server");
        }
        slot.session = Some(session);
        Ok(())
    }

    fn discard(slot: &mut SessionSlot) {
        slot.session = None;
        slot.dropped = true;
    }

    async fn run_on(
        &self,
        session: &mut dyn SqlSession,
        statement: Statement<'_>,
    ) -> Result<QueryOutcome, ServerError> {
        debug!(
            "Running statement: {}",
            truncate_for_log(statement.sql(), LOG_QUERY_TRUNCATE_LENGTH)
        );

        let work = async {
            match statement {
                Statement::Query { sql, max_rows } => {
                    session.query(sql, max_rows).await.map(QueryOutcome::Rows)
                }
                Statement::Execute { sql } => session
                    .execute(sql)
                    .await
                    .map(|rows_affected| QueryOutcome::Affected { rows_affected }),
            }
        };

        tokio::time::timeout(self.statement_timeout, work)
            .await
            .map_err(|_| ServerError::timeout(self.statement_timeout.as_secs()))?
    }
}
