//! Substring denylist over incoming query text.
//!
//! This is defense in depth, not a security boundary: it is a fixed list of
//! substrings checked against the lower-cased text, not a parser. Keywords
//! inside string literals of an otherwise-safe SELECT still trigger it, and
//! semantically equivalent statements phrased without these keywords pass.
//! Real safety would need a parser-based allowlist of SELECT-only syntax
//! trees; the substring behavior here is kept deliberately.

use crate::error::AppError;

/// Checked in order; the first hit is the one reported.
const DENYLIST: &[&str] = &[
    "drop", "delete", "update", "insert", "alter", "create", "truncate",
    "grant", "revoke", "exec", "execute", "sp_", "xp_", "--", "/*", "*/",
];

/// Reject mutating/DDL keywords and comment sequences, then require the
/// text to start with `select`. The lower-cased, trimmed copy is only
/// inspected; the caller executes the original text.
pub fn check_query(query: &str) -> Result<(), AppError> {
    let lowered = query.to_lowercase();
    let inspect = lowered.trim();
    for keyword in DENYLIST {
        if inspect.contains(keyword) {
            return Err(AppError::QueryRejected(format!(
                "query contains potentially dangerous keyword: {}",
                keyword
            )));
        }
    }
    if !inspect.starts_with("select") {
        return Err(AppError::QueryRejected(
            "only SELECT queries are allowed".into(),
        ));
    }
    Ok(())
}
