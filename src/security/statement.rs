//! Statement classification.
//!
//! Decides whether caller SQL is run as a result-set query or as a non-query
//! whose rows-affected count is reported. Only statements that cannot return
//! rows are run as non-queries; anything else goes through the query path,
//! where a batch without a result set is still reported as a status. This is
//! response shaping only, not an access check.

use once_cell::sync::Lazy;
use regex::Regex;

/// How a statement is executed and reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// May produce rows (SELECT, EXEC, DECLARE/SET/IF batches, DML with OUTPUT, ...).
    ResultSet,
    /// A single DML statement without OUTPUT, or DDL/DCL. Reports rows affected.
    NonQuery,
}

static ROWLESS_DML_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(INSERT|UPDATE|DELETE|MERGE)\b")
        .unwrap_or_else(|e| panic!("Internal error: invalid statement pattern: {}", e))
});

static DDL_DCL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(CREATE|ALTER|DROP|TRUNCATE|GRANT|REVOKE|DENY)\b")
        .unwrap_or_else(|e| panic!("Internal error: invalid statement pattern: {}", e))
});

static OUTPUT_CLAUSE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bOUTPUT\b")
        .unwrap_or_else(|e| panic!("Internal error: invalid statement pattern: {}", e))
});

static SHOW_TABLES_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*SHOW\s+TABLES\s*;?\s*$")
        .unwrap_or_else(|e| panic!("Internal error: invalid show tables pattern: {}", e))
});

/// Classify caller SQL, ignoring leading comments.
///
/// Multi-statement batches are always [`StatementKind::ResultSet`], since any
/// later statement may return rows.
pub fn classify_statement(sql: &str) -> StatementKind {
    let body = skip_leading_trivia(sql);

    if is_batch(body) {
        return StatementKind::ResultSet;
    }

    if DDL_DCL_PATTERN.is_match(body)
        || (ROWLESS_DML_PATTERN.is_match(body) && !OUTPUT_CLAUSE_PATTERN.is_match(body))
    {
        StatementKind::NonQuery
    } else {
        StatementKind::ResultSet
    }
}

/// Whether a `;` is followed by anything other than whitespace or comments.
fn is_batch(sql: &str) -> bool {
    sql.split_once(';')
        .is_some_and(|(_, rest)| !skip_leading_trivia(rest.trim_start_matches(';')).is_empty())
}

/// `SHOW TABLES` is answered with the table list instead of being sent on.
pub fn is_show_tables(sql: &str) -> bool {
    SHOW_TABLES_PATTERN.is_match(sql)
}

/// Skip whitespace, `--` line comments and `/* */` block comments.
fn skip_leading_trivia(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("--") {
            rest = match after.find('\n') {
                Some(idx) => &after[idx + 1..],
                None => "",
            };
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = match after.find("*/") {
                Some(idx) => &after[idx + 2..],
                None => "",
            };
        } else {
            return rest;
        }
    }
}
