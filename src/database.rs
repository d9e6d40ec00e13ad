//! Database connectivity and query execution.

mod connection;
pub mod metadata;
mod query;
mod tds;
pub mod types;

pub use connection::{ConnectionManager, Connector, SqlSession, Statement};
pub use query::{
    collect_first_result, truncate_for_log, ColumnInfo, QueryOutcome, QueryResult, ResultRow,
};
pub use tds::{create_config, TdsConnector, TdsSession};
pub use types::{normalize_iso8601, SqlValue, TypeMapper};
