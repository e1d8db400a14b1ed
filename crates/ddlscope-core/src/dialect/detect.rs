//! Dialect detection from dump markers

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::SqlDialect;

static CREATE_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bCREATE\s+(?:(?:TEMPORARY|TEMP|UNLOGGED)\s+)?TABLE\b")
        .expect("valid create table pattern")
});

static STORAGE_ENGINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bENGINE\s*=\s*\w").expect("valid engine pattern"));

static OWNER_TO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bOWNER\s+TO\b").expect("valid owner pattern"));

static SEARCH_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\bSET\s+search_path\b|\bset_config\s*\(\s*'search_path')")
        .expect("valid search path pattern")
});

static PUBLIC_QUALIFIED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:\bpublic|"public")\."?\w"#).expect("valid qualified name pattern")
});

pub(super) fn detect(sql: &str) -> Option<SqlDialect> {
    let dialect = if !CREATE_TABLE.is_match(sql) {
        None
    } else if STORAGE_ENGINE.is_match(sql) {
        Some(SqlDialect::MySQL)
    } else if OWNER_TO.is_match(sql) || SEARCH_PATH.is_match(sql) || PUBLIC_QUALIFIED.is_match(sql)
    {
        Some(SqlDialect::PostgreSQL)
    } else {
        None
    };
    debug!(dialect = ?dialect, "detected dialect");
    dialect
}
