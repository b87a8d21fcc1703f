//! Textual reference extraction from SQL definition bodies
//!
//! A deliberately shallow scan: five clause keywords (`FROM`, `JOIN`,
//! `UPDATE`, `INSERT INTO`, `DELETE FROM`) anchor a regex that captures
//! the identifier that follows. No SQL grammar is involved, so keywords
//! inside string literals or comments produce false candidates. Every
//! candidate must be validated against the catalog before it is trusted.

use crate::key::ObjectKey;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// `ident` or `ident.ident`
const IDENT: &str = r"[a-zA-Z_][a-zA-Z0-9_]*(?:\.[a-zA-Z_][a-zA-Z0-9_]*)?";

/// Clause keywords that introduce a relation name
const CLAUSE_KEYWORDS: [&str; 5] = ["FROM", "JOIN", "UPDATE", r"INSERT\s+INTO", r"DELETE\s+FROM"];

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

fn clause_patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        CLAUSE_KEYWORDS
            .iter()
            .filter_map(|keyword| Regex::new(&format!(r"(?i)\b{}\s+({})", keyword, IDENT)).ok())
            .collect()
    })
}

/// Extract candidate relation references from a SQL definition body.
///
/// Matches are lowercased; bare names are qualified with
/// `default_schema`. The sorted set makes downstream iteration
/// deterministic.
pub fn extract_references(sql: &str, default_schema: &str) -> BTreeSet<ObjectKey> {
    let default_schema = default_schema.to_lowercase();
    let mut found = BTreeSet::new();

    for pattern in clause_patterns() {
        for captures in pattern.captures_iter(sql) {
            let Some(raw) = captures.get(1) else {
                continue;
            };
            let candidate = raw.as_str().to_lowercase();
            let key = match candidate.split_once('.') {
                Some((schema, name)) => ObjectKey::new(schema, name),
                None => ObjectKey::new(default_schema.as_str(), candidate),
            };
            found.insert(key);
        }
    }

    found
}
