//! Query Gate
//!
//! Restricts submitted text to read-only SELECT queries using a static
//! denylist. This is pattern matching over text, not SQL parsing: it is a
//! coarse filter and the dataset's read-only connection is the real guard.
//! The `--` rule also rejects the marker inside string literals.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Statement keywords that may never appear as a whole word
pub const FORBIDDEN_KEYWORDS: [&str; 9] = [
    "drop", "delete", "update", "insert", "alter", "create", "truncate", "grant", "revoke",
];

const COMMENT_MARKER: &str = "--";

lazy_static! {
    static ref FORBIDDEN_OPERATION: Regex = Regex::new(&format!(
        r"(?i)\b({})\b",
        FORBIDDEN_KEYWORDS.join("|")
    ))
    .unwrap();
    static ref SYSTEM_CATALOG: Regex =
        Regex::new(r"(?i)\b(pg_\w+|information_schema|sqlite_\w+)\b").unwrap();
}

/// Why a query was turned away
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "matched", rename_all = "snake_case")]
pub enum QueryRejection {
    NotSelect,
    ForbiddenKeyword(String),
    SystemCatalog(String),
    CommentMarker,
}

impl fmt::Display for QueryRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryRejection::NotSelect => write!(f, "only SELECT statements are allowed"),
            QueryRejection::ForbiddenKeyword(word) => {
                write!(f, "forbidden operation '{}'", word)
            }
            QueryRejection::SystemCatalog(name) => {
                write!(f, "system table '{}' is off limits", name)
            }
            QueryRejection::CommentMarker => write!(f, "comment marker '--' is not allowed"),
        }
    }
}

/// Check query text against the gate, naming the first rule it breaks.
///
/// Rules run in order: SELECT prefix, forbidden keyword, system catalog,
/// comment marker.
pub fn check_query(text: &str) -> Result<(), QueryRejection> {
    let normalized = text.trim().to_lowercase();

    if !normalized.starts_with("select") {
        return Err(QueryRejection::NotSelect);
    }

    if let Some(found) = FORBIDDEN_OPERATION.find(&normalized) {
        return Err(QueryRejection::ForbiddenKeyword(found.as_str().to_string()));
    }

    if let Some(found) = SYSTEM_CATALOG.find(&normalized) {
        return Err(QueryRejection::SystemCatalog(found.as_str().to_string()));
    }

    if text.contains(COMMENT_MARKER) {
        return Err(QueryRejection::CommentMarker);
    }

    Ok(())
}

/// Whether the text is allowed to reach the dataset
pub fn is_query_allowed(text: &str) -> bool {
    check_query(text).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_select() {
        assert!(is_query_allowed("SELECT * FROM bombs"));
        assert!(is_query_allowed("   select location, signal_strength from bombs;  "));
    }

    #[test]
    fn test_accepts_joins() {
        let sql = "SELECT s.name, a.action_performed, b.location
                   FROM suspects s
                   JOIN access_logs a ON s.suspect_id = a.suspect_id
                   JOIN bombs b ON a.bomb_id = b.bomb_id
                   WHERE a.action_performed = 'Installation'";
        assert!(is_query_allowed(sql));
    }

    #[test]
    fn test_rejects_non_select() {
        assert_eq!(check_query("DROP TABLE bombs"), Err(QueryRejection::NotSelect));
        assert_eq!(check_query("with x as (select 1) select * from x"), Err(QueryRejection::NotSelect));
        assert_eq!(check_query(""), Err(QueryRejection::NotSelect));
        assert_eq!(check_query("   "), Err(QueryRejection::NotSelect));
    }

    #[test]
    fn test_rejects_forbidden_keyword_behind_select() {
        for keyword in FORBIDDEN_KEYWORDS {
            let lower = format!("SELECT * FROM bombs; {} something", keyword);
            let upper = format!("select * from bombs; {} something", keyword.to_uppercase());
            assert!(!is_query_allowed(&lower), "{}", lower);
            assert!(!is_query_allowed(&upper), "{}", upper);
        }
        assert_eq!(
            check_query("SELECT 1; Delete FROM bombs"),
            Err(QueryRejection::ForbiddenKeyword("delete".to_string()))
        );
    }

    #[test]
    fn test_keyword_inside_identifier_is_fine() {
        assert!(is_query_allowed("SELECT last_updated_at, created_by FROM bombs"));
        assert!(is_query_allowed("SELECT * FROM dropzones"));
    }

    #[test]
    fn test_rejects_system_catalog() {
        assert_eq!(
            check_query("SELECT name FROM sqlite_master"),
            Err(QueryRejection::SystemCatalog("sqlite_master".to_string()))
        );
        assert!(!is_query_allowed("SELECT * FROM information_schema.tables"));
        assert!(!is_query_allowed("SELECT * FROM PG_TABLES"));
    }

    #[test]
    fn test_rejects_comment_marker_anywhere() {
        assert_eq!(
            check_query("SELECT * FROM bombs -- trailing"),
            Err(QueryRejection::CommentMarker)
        );
        assert!(!is_query_allowed("SELECT * FROM bombs WHERE location = 'a--b'"));
    }

    #[test]
    fn test_verdict_is_case_invariant() {
        let pairs = [
            ("SELECT * FROM bombs", "select * FROM bombs"),
            ("SELECT * FROM bombs; DROP TABLE x", "select * from bombs; drop table x"),
            ("SELECT * FROM SQLITE_MASTER", "select * from sqlite_master"),
        ];
        for (a, b) in pairs {
            assert_eq!(is_query_allowed(a), is_query_allowed(b));
        }
    }

    #[test]
    fn test_first_failing_rule_is_reported() {
        assert_eq!(
            check_query("SELECT * FROM sqlite_master; DROP TABLE bombs --"),
            Err(QueryRejection::ForbiddenKeyword("drop".to_string()))
        );
    }
}
