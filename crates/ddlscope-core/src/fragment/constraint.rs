//! Table-level constraint fragments (PRIMARY KEY / FOREIGN KEY lists)

use once_cell::sync::Lazy;
use regex::Regex;

use super::{split_identifier_list, IDENT, QUALIFIED_IDENT};
use crate::dialect::SqlDialect;
use crate::schema::ForeignKey;

static PRIMARY_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^(?:CONSTRAINT\s+{IDENT}\s+)?PRIMARY\s+KEY\s*(?:USING\s+\w+\s*)?\((?P<columns>(?:[^()]|\([^()]*\))*)\)"
    ))
    .expect("valid primary key pattern")
});

static FOREIGN_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)^(?:CONSTRAINT\s+{IDENT}\s+)?FOREIGN\s+KEY\s*(?:{IDENT}\s*)?\((?P<columns>[^)]+)\)\s*REFERENCES\s+(?P<table>{qualified})\s*\((?P<references>[^)]+)\)",
        qualified = *QUALIFIED_IDENT
    ))
    .expect("valid foreign key pattern")
});

/// A constraint declared apart from the columns it applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey(Vec<String>),
    ForeignKey(ForeignKeyConstraint),
}

/// `FOREIGN KEY (a, b) REFERENCES t (x, y)` before decomposition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub columns: Vec<String>,
    pub references_table: String,
    pub references_columns: Vec<String>,
}

impl ForeignKeyConstraint {
    /// One single-column foreign key per local column, paired by position
    /// with the referenced list. Positions with no counterpart fall back to
    /// the first referenced column.
    pub fn decompose(&self) -> Vec<ForeignKey> {
        let Some(first) = self.references_columns.first() else {
            return Vec::new();
        };
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| {
                let target = self
                    .references_columns
                    .get(idx)
                    .filter(|c| !c.is_empty())
                    .unwrap_or(first);
                ForeignKey::new(column.clone(), &self.references_table, target.clone())
            })
            .collect()
    }
}

/// Parse a constraint fragment. Anything other than a primary or foreign
/// key (UNIQUE, KEY, CHECK, ...) yields `None`.
pub fn parse_table_constraint(fragment: &str, dialect: SqlDialect) -> Option<TableConstraint> {
    let fragment = fragment.trim();

    if let Some(caps) = PRIMARY_KEY.captures(fragment) {
        let columns = split_identifier_list(&caps["columns"]);
        return (!columns.is_empty()).then_some(TableConstraint::PrimaryKey(columns));
    }

    if let Some(caps) = FOREIGN_KEY.captures(fragment) {
        let columns = split_identifier_list(&caps["columns"]);
        let references_columns = split_identifier_list(&caps["references"]);
        if columns.is_empty() || references_columns.is_empty() {
            return None;
        }
        return Some(TableConstraint::ForeignKey(ForeignKeyConstraint {
            columns,
            references_table: dialect.normalize_name(&caps["table"]),
            references_columns,
        }));
    }

    None
}
