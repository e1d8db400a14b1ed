//! MySQL dump parsing (`mysqldump` / `db/structure.sql` style)

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{SqlDialect, StructureParser};
use crate::fragment::column::{clean_default, strip_inline_markers};
use crate::fragment::constraint::parse_table_constraint;
use crate::fragment::{is_constraint_line, split_definitions, unquote};
use crate::schema::{Column, Structure, StructureBuilder, TableBuilder};

/// `CREATE TABLE name ( body ) ENGINE=`
static TABLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)CREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<name>(?:`[^`]+`|\w+)(?:\.(?:`[^`]+`|\w+))?)\s*\((?P<body>[^;]+?)\)\s*ENGINE\s*=",
    )
    .expect("valid mysql table pattern")
});

/// Identifier, then the type token run: a word, an optional argument list
/// and sign/fill modifiers. Everything after is column options.
static COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)^(?:`(?P<quoted>[^`]+)`|(?P<name>\w+))\s+(?P<type>\w+(?:\s*\([^)]*\))?(?:\s+(?:unsigned|signed|zerofill))*)(?P<options>.*)$",
    )
    .expect("valid mysql column pattern")
});

static DEFAULT_VALUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\bDEFAULT\s+(?P<value>'(?:[^'\\]|\\.|'')*'|"(?:[^"\\]|\\.|"")*"|\((?:[^()]|\([^()]*\))*\)|[^\s,]+)"#,
    )
    .expect("valid mysql default pattern")
});

static COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+COMMENT\s+'(?:[^'\\]|\\.|'')*'").expect("valid mysql comment pattern")
});

/// Structural parser for MySQL-family dumps
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlParser;

impl StructureParser for MySqlParser {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::MySQL
    }

    fn parse(&self, sql: &str) -> Structure {
        let mut builder = StructureBuilder::new();

        for caps in TABLE_BLOCK.captures_iter(sql) {
            let name = SqlDialect::MySQL.normalize_name(&caps["name"]);
            builder.add_table(parse_table(name, &caps["body"]));
        }

        builder.build()
    }
}

fn parse_table(name: String, body: &str) -> TableBuilder {
    let mut table = TableBuilder::new(name);
    let mut constraints = Vec::new();

    for fragment in split_definitions(body) {
        if is_constraint_line(&fragment, SqlDialect::MySQL) {
            constraints.push(fragment);
            continue;
        }
        match parse_column(&fragment) {
            Some(column) => table.push_column(column),
            None => debug!(
                table = table.name(),
                fragment = %fragment,
                "skipping unrecognized column definition"
            ),
        }
    }

    for fragment in &constraints {
        if let Some(constraint) = parse_table_constraint(fragment, SqlDialect::MySQL) {
            table.apply(&constraint);
        }
    }

    table
}

/// Parse one column line such as `` `id` int unsigned NOT NULL DEFAULT '0' ``
pub(crate) fn parse_column(fragment: &str) -> Option<Column> {
    let caps = COLUMN.captures(fragment)?;
    let name = caps
        .name("quoted")
        .or_else(|| caps.name("name"))
        .map(|m| unquote(m.as_str()))?;

    let options = COMMENT.replace_all(&caps["options"], "");
    let default = DEFAULT_VALUE
        .captures(&options)
        .map(|d| clean_default(&d["value"], false));
    let options = DEFAULT_VALUE.replace(&options, "");
    let (_, markers) = strip_inline_markers(&options);

    let mut column = Column::new(name, caps["type"].trim());
    column.is_nullable = !markers.not_null;
    column.is_primary_key = markers.primary_key;
    column.default_value = default;
    column.foreign_key = markers.foreign_key(&column.name, SqlDialect::MySQL);
    Some(column)
}
