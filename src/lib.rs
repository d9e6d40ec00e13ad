//! # MSSQL Tool Adapter
//!
//! A Model Context Protocol (MCP) server that exposes a Microsoft SQL Server
//! database to MCP hosts over stdio.
//!
//! This crate provides:
//! - **Tools**: `list_tables`, `read_table` and `execute_sql`
//! - **Resources**: `mssql://{table}/data`, the first rows of a table as CSV
//!
//! ## Architecture
//!
//! - Configuration comes from environment variables, validated once
//! - A single database session is opened lazily and reconnected at most once
//!   per request
//! - Results and failures are JSON tool results; failures carry an error
//!   kind from a closed taxonomy

pub mod config;
pub mod constants;
pub mod database;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod resources;
pub mod response;
pub mod security;
pub mod server;
pub mod shutdown;
pub mod tools;

pub use config::Config;
pub use error::{ErrorKind, ServerError};
pub use server::MssqlAdapterServer;
