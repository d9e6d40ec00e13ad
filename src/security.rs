//! Identifier validation and statement classification.
//!
//! Caller-supplied SQL for `execute_sql` is never filtered; the database
//! user's grants are the only guard there. Identifiers interpolated by the
//! adapter itself (table names) are validated here first.

mod identifiers;
mod statement;

pub use identifiers::{escape_identifier, safe_table_name, validate_table_name};
pub use statement::{classify_statement, is_show_tables, StatementKind};
