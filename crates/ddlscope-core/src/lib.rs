//! ddlscope-core: structural extraction from SQL schema dumps
//!
//! This library detects the dialect of a DDL dump (MySQL or PostgreSQL) and
//! recovers its tables, columns, primary keys and foreign keys by pattern
//! scanning, without a database connection or a full SQL grammar.

pub mod dialect;
pub mod error;
pub mod fragment;
pub mod schema;

use tracing::debug;

pub use dialect::{select, MySqlParser, PostgresParser, SqlDialect, StructureParser};
pub use error::{Error, Result};
pub use schema::{Column, ForeignKey, Structure, Table};

/// Extract the structure of a dump, detecting its dialect first.
///
/// A dump whose dialect is not recognized yields an empty structure.
pub fn extract(sql: &str) -> Structure {
    match SqlDialect::detect(sql) {
        Some(dialect) => extract_as(dialect, sql),
        None => {
            debug!("no recognizable schema dialect");
            Structure::empty()
        }
    }
}

/// Extract the structure of a dump known to be in `dialect`
pub fn extract_as(dialect: SqlDialect, sql: &str) -> Structure {
    dialect.parser().parse(sql)
}
