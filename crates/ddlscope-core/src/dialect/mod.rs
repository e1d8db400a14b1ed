//! SQL dialect support

mod detect;
mod mysql;
mod postgres;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fragment::unquote;
use crate::schema::Structure;

pub use mysql::MySqlParser;
pub use postgres::PostgresParser;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    PostgreSQL,
    MySQL,
}

/// Turns a whole dump into a [`Structure`] for one dialect.
///
/// Parsing never fails: fragments that do not match the dialect's shapes
/// are left out of the result.
pub trait StructureParser: Send + Sync {
    fn dialect(&self) -> SqlDialect;

    fn parse(&self, sql: &str) -> Structure;
}

impl SqlDialect {
    /// Guess the dialect of a dump from its textual markers.
    ///
    /// MySQL markers are checked first, so a document carrying both kinds is
    /// classified as MySQL. `None` means no schema is recognizable.
    pub fn detect(sql: &str) -> Option<Self> {
        detect::detect(sql)
    }

    /// Get the structural parser for this dialect
    pub fn parser(&self) -> Box<dyn StructureParser> {
        match self {
            SqlDialect::PostgreSQL => Box::new(PostgresParser),
            SqlDialect::MySQL => Box::new(MySqlParser),
        }
    }

    /// Get default schema name for this dialect
    pub fn default_schema(&self) -> &'static str {
        match self {
            SqlDialect::PostgreSQL => "public",
            SqlDialect::MySQL => "",
        }
    }

    /// Whether default values may carry a `::type` cast suffix
    pub fn has_cast_suffix(&self) -> bool {
        matches!(self, SqlDialect::PostgreSQL)
    }

    /// Normalize a table name as written in DDL: quoting removed and a
    /// leading default-schema qualifier dropped.
    pub fn normalize_name(&self, raw: &str) -> String {
        let name = unquote(raw);
        let schema = self.default_schema();
        if schema.is_empty() {
            return name;
        }
        match name.strip_prefix(schema).and_then(|rest| rest.strip_prefix('.')) {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => name,
        }
    }
}

/// Get the structural parser for a dialect tag such as `"mysql"` or
/// `"postgres"`
pub fn select(tag: &str) -> Result<Box<dyn StructureParser>> {
    let dialect: SqlDialect = tag.parse()?;
    Ok(dialect.parser())
}

impl FromStr for SqlDialect {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            "mysql" | "mysql8" => Ok(SqlDialect::MySQL),
            _ => Err(Error::unsupported_dialect(s)),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::PostgreSQL => write!(f, "postgresql"),
            SqlDialect::MySQL => write!(f, "mysql"),
        }
    }
}
