//! Tool input types with JSON Schema generation.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the `read_table` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ReadTableInput {
    /// Table name. Letters, digits and underscores only, optionally
    /// schema-qualified (e.g. `Orders` or `sales.Orders`).
    pub table: String,
}

/// Input for the `execute_sql` tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteSqlInput {
    /// SQL text, sent to the server as-is.
    pub query: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_table_input_deserialize() {
        let input: ReadTableInput = serde_json::from_str(r#"{"table": "Users"}"#).unwrap();
        assert_eq!(input.table, "Users");

        assert!(serde_json::from_str::<ReadTableInput>(r#"{"name": "Users"}"#).is_err());
    }

    #[test]
    fn test_execute_sql_input_deserialize() {
        let input: ExecuteSqlInput =
            serde_json::from_str(r#"{"query": "SELECT 1 AS x"}"#).unwrap();
        assert_eq!(input.query, "SELECT 1 AS x");

        assert!(serde_json::from_str::<ExecuteSqlInput>(r#"{"query": 42}"#).is_err());
    }

    #[test]
    fn test_input_schema_has_required_field() {
        let schema = serde_json::to_value(schemars::schema_for!(ExecuteSqlInput)).unwrap();
        assert_eq!(schema["required"], serde_json::json!(["query"]));
    }
}
