//! SQL helpers

use sqlformat::{FormatOptions, QueryParams};

/// Leading keywords of statements commonly found in query logs
const STATEMENT_KEYWORDS: &[&str] = &[
    "alter", "begin", "commit", "create", "delete", "drop", "explain", "insert", "release",
    "rollback", "savepoint", "select", "set", "truncate", "update", "with",
];

/// Uppercase keywords and put each clause on its own line
pub fn reformat(sql: &str) -> String {
    let options = FormatOptions {
        uppercase: true,
        ..FormatOptions::default()
    };
    sqlformat::format(sql, &QueryParams::None, options)
}

/// Whether `text` starts like a SQL statement
pub fn looks_like_sql(text: &str) -> bool {
    let first = text
        .trim_start()
        .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
        .next()
        .unwrap_or("");
    STATEMENT_KEYWORDS
        .iter()
        .any(|keyword| keyword.eq_ignore_ascii_case(first))
}
