//! Request dispatch for the three table operations.
//!
//! The dispatcher holds no request state of its own. It validates input,
//! builds the statement and hands it to the [`ConnectionManager`].

use crate::config::LimitsConfig;
use crate::constants::LOG_QUERY_TRUNCATE_LENGTH;
use crate::database::metadata::{read_table_query, table_names, LIST_TABLES_QUERY};
use crate::database::{truncate_for_log, ConnectionManager, QueryOutcome, QueryResult, Statement};
use crate::error::ServerError;
use crate::response::Reply;
use crate::security::{classify_statement, is_show_tables, safe_table_name, StatementKind};
use std::sync::Arc;
use tracing::{debug, info};

/// Routes tool requests to the database session.
#[derive(Clone)]
pub struct Dispatcher {
    connections: Arc<ConnectionManager>,
    limits: LimitsConfig,
}

impl Dispatcher {
    /// Create a dispatcher over a shared connection manager.
    pub fn new(connections: Arc<ConnectionManager>, limits: LimitsConfig) -> Self {
        Self {
            connections,
            limits,
        }
    }

    /// The connection manager this dispatcher runs statements on.
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Names of the base tables in the configured database.
    pub async fn list_tables(&self) -> Result<Vec<String>, ServerError> {
        let outcome = self
            .connections
            .run(Statement::Query {
                sql: LIST_TABLES_QUERY,
                max_rows: usize::MAX,
            })
            .await?;

        let names = match outcome {
            QueryOutcome::Rows(result) => table_names(&result),
            QueryOutcome::Affected { .. } => Vec::new(),
        };
        debug!("Listed {} tables", names.len());
        Ok(names)
    }

    /// Leading rows of a table, up to the read-table cap.
    ///
    /// The name is validated before anything is sent to the server.
    pub async fn read_table(&self, table: &str) -> Result<QueryResult, ServerError> {
        let quoted = safe_table_name(table)?;
        let cap = self.limits.read_table_rows;

        // One extra row tells us whether the table had more.
        let sql = read_table_query(&quoted, cap.saturating_add(1));
        let outcome = self
            .connections
            .run(Statement::Query {
                sql: &sql,
                max_rows: cap,
            })
            .await?;

        match outcome {
            QueryOutcome::Rows(result) => Ok(result),
            QueryOutcome::Affected { .. } => Ok(QueryResult::empty()),
        }
    }

    /// Run caller SQL verbatim.
    pub async fn execute_sql(&self, sql: &str) -> Result<Reply, ServerError> {
        if sql.trim().is_empty() {
            return Err(ServerError::invalid_input("Query text cannot be empty"));
        }

        if is_show_tables(sql) {
            return self.list_tables().await.map(Reply::Tables);
        }

        info!(
            "Executing SQL: {}",
            truncate_for_log(sql, LOG_QUERY_TRUNCATE_LENGTH)
        );

        let statement = match classify_statement(sql) {
            StatementKind::ResultSet => Statement::Query {
                sql,
                max_rows: self.limits.max_result_rows,
            },
            StatementKind::NonQuery => Statement::Execute { sql },
        };

        let reply = match self.connections.run(statement).await? {
            QueryOutcome::Rows(result) if result.has_result_set() => Reply::Rows(result),
            QueryOutcome::Rows(_) => Reply::Status { rows_affected: 0 },
            QueryOutcome::Affected { rows_affected } => Reply::Status { rows_affected },
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ColumnInfo, Connector, SqlSession, SqlValue};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Session that records every statement and returns one fixed result.
    struct RecordingSession {
        seen: Arc<StdMutex<Vec<String>>>,
        result: QueryResult,
    }

    struct RecordingConnector {
        seen: Arc<StdMutex<Vec<String>>>,
        result: QueryResult,
    }

    #[async_trait]
    impl Connector for RecordingConnector {
        async fn connect(&self) -> Result<Box<dyn SqlSession>, ServerError> {
            Ok(Box::new(RecordingSession {
                seen: Arc::clone(&self.seen),
                result: self.result.clone(),
            }))
        }
    }

    #[async_trait]
    impl SqlSession for RecordingSession {
        async fn query(&mut self, sql: &str, max_rows: usize) -> Result<QueryResult, ServerError> {
            self.seen.lock().unwrap().push(sql.to_string());
            let mut result = self.result.clone();
            if result.rows.len() > max_rows {
                result.rows.truncate(max_rows);
                result.truncated = true;
            }
            Ok(result)
        }

        async fn execute(&mut self, sql: &str) -> Result<u64, ServerError> {
            self.seen.lock().unwrap().push(sql.to_string());
            Ok(7)
        }
    }

    fn dispatcher(result: QueryResult, limits: LimitsConfig) -> (Dispatcher, Arc<StdMutex<Vec<String>>>) {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let connector = RecordingConnector {
            seen: Arc::clone(&seen),
            result,
        };
        let manager = ConnectionManager::new(Box::new(connector), Duration::from_secs(5));
        (Dispatcher::new(Arc::new(manager), limits), seen)
    }

    fn numbers(count: i64) -> QueryResult {
        QueryResult {
            columns: vec![ColumnInfo::new("n", "INT")],
            rows: (0..count)
                .map(|n| [("n", SqlValue::Int(n))].into_iter().collect())
                .collect(),
            truncated: false,
        }
    }

    #[tokio::test]
    async fn test_read_table_quotes_name() {
        let (d, seen) = dispatcher(numbers(1), LimitsConfig::default());
        d.read_table("dbo.Users").await.unwrap();
        assert_eq!(
            seen.lock().unwrap().as_slice(),
            ["SELECT TOP (101) * FROM [dbo].[Users]"]
        );
    }

    #[tokio::test]
    async fn test_read_table_rejects_before_query() {
        let (d, seen) = dispatcher(numbers(1), LimitsConfig::default());
        let err = d.read_table("Users; DROP TABLE Users").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Protocol);
        assert!(seen.lock().unwrap().is_empty());
        assert!(!d.connections().is_connected().await);
    }

    #[tokio::test]
    async fn test_read_table_flags_truncation() {
        let limits = LimitsConfig {
            max_result_rows: 1000,
            read_table_rows: 2,
        };
        let (d, _) = dispatcher(numbers(3), limits);
        let result = d.read_table("T").await.unwrap();
        assert_eq!(result.rows.len(), 2);
        assert!(result.truncated);
    }

    #[tokio::test]
    async fn test_execute_routes_by_statement_kind() {
        let (d, seen) = dispatcher(numbers(1), LimitsConfig::default());

        let reply = d.execute_sql("SELECT n FROM t").await.unwrap();
        assert!(matches!(reply, Reply::Rows(_)));

        let reply = d.execute_sql("DELETE FROM t").await.unwrap();
        assert_eq!(reply, Reply::Status { rows_affected: 7 });

        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_batches_and_output_clauses_return_rows() {
        let (d, seen) = dispatcher(numbers(1), LimitsConfig::default());

        for sql in [
            "DECLARE @n INT = 5; SELECT @n AS n",
            "SET NOCOUNT ON; SELECT 1 AS n",
            "IF 1 = 1 SELECT 1 AS n",
            "INSERT INTO t (n) OUTPUT inserted.n VALUES (0)",
        ] {
            let reply = d.execute_sql(sql).await.unwrap();
            match reply {
                Reply::Rows(result) => assert_eq!(result.rows.len(), 1, "{}", sql),
                other => panic!("expected rows for {:?}, got {:?}", sql, other),
            }
        }
        assert_eq!(seen.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_batch_without_result_set_is_status() {
        let (d, _) = dispatcher(QueryResult::empty(), LimitsConfig::default());
        let reply = d
            .execute_sql("SET NOCOUNT ON; UPDATE t SET n = 1")
            .await
            .unwrap();
        assert_eq!(reply, Reply::Status { rows_affected: 0 });
    }

    #[tokio::test]
    async fn test_select_without_result_set_is_status() {
        let (d, _) = dispatcher(QueryResult::empty(), LimitsConfig::default());
        let reply = d.execute_sql("EXEC dbo.DoNothing").await.unwrap();
        assert_eq!(reply, Reply::Status { rows_affected: 0 });
    }

    #[tokio::test]
    async fn test_empty_sql_is_protocol_error() {
        let (d, seen) = dispatcher(numbers(1), LimitsConfig::default());
        let err = d.execute_sql("   ").await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Protocol);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_show_tables_alias() {
        let catalog = QueryResult {
            columns: vec![ColumnInfo::new("TABLE_NAME", "NVARCHAR")],
            rows: ["B", "A"]
                .iter()
                .map(|n| {
                    [("TABLE_NAME", SqlValue::String(n.to_string()))]
                        .into_iter()
                        .collect()
                })
                .collect(),
            truncated: false,
        };
        let (d, seen) = dispatcher(catalog, LimitsConfig::default());

        let reply = d.execute_sql("show tables;").await.unwrap();
        assert_eq!(reply, Reply::Tables(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(seen.lock().unwrap().as_slice(), [LIST_TABLES_QUERY]);
    }
}
