//! PostgreSQL dump parsing (`pg_dump` / `db/structure.sql` style)

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::{SqlDialect, StructureParser};
use crate::fragment::column::{clean_default, strip_column_markers};
use crate::fragment::constraint::{parse_table_constraint, TableConstraint};
use crate::fragment::{is_constraint_line, split_definitions, IDENT, QUALIFIED_IDENT};
use crate::schema::{Column, Structure, StructureBuilder, TableBuilder};

/// `CREATE TABLE [IF NOT EXISTS] name ( body );`
static TABLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?is)CREATE\s+(?:(?:UNLOGGED|TEMPORARY|TEMP)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?P<name>{qualified})\s*\((?P<body>.*?)\)(?:\s*INHERITS\s*\([^)]*\))?\s*;",
        qualified = *QUALIFIED_IDENT
    ))
    .expect("valid postgres table pattern")
});

/// The type capture is lazy so it stops before a DEFAULT / NOT NULL suffix.
static COLUMN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)^(?:"(?P<quoted>[^"]+)"|(?P<name>\w+))\s+(?P<type>.+?)(?:\s+DEFAULT\s+(?P<default>.+?))?(?:\s+(?P<notnull>NOT\s+NULL))?\s*$"#,
    )
    .expect("valid postgres column pattern")
});

/// Prefix shared by `ALTER TABLE ... ADD` statements
static ALTER_TABLE_ADD: Lazy<String> = Lazy::new(|| {
    format!(
        r"(?is)ALTER\s+TABLE\s+(?:IF\s+EXISTS\s+)?(?:ONLY\s+)?(?P<table>{qualified})\s+ADD\s+",
        qualified = *QUALIFIED_IDENT
    )
});

static ALTER_PRIMARY_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{prefix}(?P<constraint>(?:CONSTRAINT\s+{IDENT}\s+)?PRIMARY\s+KEY\s*\([^;]*?\))",
        prefix = *ALTER_TABLE_ADD
    ))
    .expect("valid alter primary key pattern")
});

static ALTER_FOREIGN_KEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{prefix}(?P<constraint>(?:CONSTRAINT\s+{IDENT}\s+)?FOREIGN\s+KEY\s*\([^;)]*\)\s*REFERENCES\s+{qualified}\s*\([^;)]*\))",
        prefix = *ALTER_TABLE_ADD,
        qualified = *QUALIFIED_IDENT
    ))
    .expect("valid alter foreign key pattern")
});

/// Structural parser for PostgreSQL-family dumps
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresParser;

impl StructureParser for PostgresParser {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::PostgreSQL
    }

    fn parse(&self, sql: &str) -> Structure {
        let mut builder = StructureBuilder::new();

        for caps in TABLE_BLOCK.captures_iter(sql) {
            let name = SqlDialect::PostgreSQL.normalize_name(&caps["name"]);
            builder.add_table(parse_table(name, &caps["body"]));
        }

        // Constraints added once the tables exist
        apply_deferred(&mut builder, &ALTER_PRIMARY_KEY, sql);
        apply_deferred(&mut builder, &ALTER_FOREIGN_KEY, sql);

        builder.build()
    }
}

fn apply_deferred(builder: &mut StructureBuilder, statement: &Regex, sql: &str) {
    for caps in statement.captures_iter(sql) {
        let table = SqlDialect::PostgreSQL.normalize_name(&caps["table"]);
        match parse_table_constraint(&caps["constraint"], SqlDialect::PostgreSQL) {
            Some(constraint) => builder.apply_deferred(&table, &constraint),
            None => debug!(table = %table, "skipping unrecognized ALTER TABLE constraint"),
        }
    }
}

fn parse_table(name: String, body: &str) -> TableBuilder {
    let mut table = TableBuilder::new(name);
    let mut constraints: Vec<TableConstraint> = Vec::new();

    for fragment in split_definitions(body) {
        if is_constraint_line(&fragment, SqlDialect::PostgreSQL) {
            if let Some(constraint) = parse_table_constraint(&fragment, SqlDialect::PostgreSQL) {
                constraints.push(constraint);
            }
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

    for constraint in &constraints {
        table.apply(constraint);
    }

    table
}

/// Parse one column line such as
/// `status character varying DEFAULT 'draft'::character varying NOT NULL`
pub(crate) fn parse_column(fragment: &str) -> Option<Column> {
    let caps = COLUMN.captures(fragment)?;
    let name = caps
        .name("quoted")
        .or_else(|| caps.name("name"))
        .map(|m| m.as_str().to_string())?;

    let (declared_type, default, markers) = strip_column_markers(
        caps["type"].trim(),
        caps.name("default").map(|m| m.as_str()),
    );

    let mut column = Column::new(name, declared_type);
    column.is_nullable = caps.name("notnull").is_none() && !markers.not_null;
    column.is_primary_key = markers.primary_key;
    column.default_value = default
        .filter(|raw| !raw.is_empty())
        .map(|raw| clean_default(&raw, true));
    column.foreign_key = markers.foreign_key(&column.name, SqlDialect::PostgreSQL);
    Some(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ForeignKey;

    #[test]
    fn test_parse_column_plain() {
        assert_eq!(parse_column("id serial"), Some(Column::new("id", "serial")));
    }

    #[test]
    fn test_parse_column_default_and_not_null() {
        let column =
            parse_column("status character varying DEFAULT 'draft'::character varying NOT NULL")
                .unwrap();
        assert_eq!(column.declared_type, "character varying");
        assert_eq!(column.default_value.as_deref(), Some("draft"));
        assert!(!column.is_nullable);
    }

    #[test]
    fn test_parse_column_not_null_before_default() {
        let column = parse_column("count integer NOT NULL DEFAULT 0").unwrap();
        assert_eq!(column.declared_type, "integer");
        assert_eq!(column.default_value.as_deref(), Some("0"));
        assert!(!column.is_nullable);
    }

    #[test]
    fn test_parse_column_sequence_default() {
        let column =
            parse_column("id bigint DEFAULT nextval('users_id_seq'::regclass) NOT NULL").unwrap();
        assert_eq!(column.declared_type, "bigint");
        assert_eq!(
            column.default_value.as_deref(),
            Some("nextval('users_id_seq'::regclass)")
        );
    }

    #[test]
    fn test_parse_column_multi_word_type() {
        let column = parse_column("created_at timestamp(6) without time zone NOT NULL").unwrap();
        assert_eq!(column.declared_type, "timestamp(6) without time zone");
        assert!(!column.is_nullable);
    }

    #[test]
    fn test_parse_column_inline_constraints() {
        let column = parse_column("id serial PRIMARY KEY").unwrap();
        assert_eq!(column.declared_type, "serial");
        assert!(column.is_primary_key);

        let column = parse_column("user_id integer REFERENCES users(id)").unwrap();
        assert_eq!(column.declared_type, "integer");
        assert_eq!(
            column.foreign_key,
            Some(ForeignKey::new("user_id", "users", "id"))
        );
    }

    #[test]
    fn test_parse_column_quoted_name() {
        let column = parse_column(r#""First Name" text"#).unwrap();
        assert_eq!(column.name, "First Name");
        assert_eq!(column.declared_type, "text");
    }

    #[test]
    fn test_parse_column_literal_mentioning_not_null() {
        let column =
            parse_column("label character varying DEFAULT 'not null'::character varying").unwrap();
        assert_eq!(column.declared_type, "character varying");
        assert_eq!(column.default_value.as_deref(), Some("not null"));
        assert!(column.is_nullable);
    }

    #[test]
    fn test_parse_column_inline_check() {
        let column = parse_column("body text CHECK (body IS NOT NULL)").unwrap();
        assert_eq!(column.declared_type, "text CHECK (body IS NOT NULL)");
        assert!(column.is_nullable);
    }

    #[test]
    fn test_keyword_named_columns() {
        let sql = [
            "CREATE TABLE public.steps (",
            "    id bigint NOT NULL,",
            "    index integer NOT NULL,",
            "    exclude boolean,",
            "    spatial boolean,",
            "    CONSTRAINT steps_index_check CHECK (index >= 0)",
            ");",
        ]
        .join("\n");
        let structure = PostgresParser.parse(&sql);
        let steps = &structure.tables[0];
        assert_eq!(steps.column_names(), vec!["id", "index", "exclude", "spatial"]);
        assert!(!steps.columns[1].is_nullable);
        assert_eq!(steps.columns[1].declared_type, "integer");
    }

    #[test]
    fn test_parse_malformed_column() {
        assert_eq!(parse_column("id"), None);
        assert_eq!(parse_column("id integer\n  CHECK (id > 0)"), None);
    }

    #[test]
    fn test_schema_qualified_table_name() {
        let structure = PostgresParser.parse("CREATE TABLE public.users (\n  id integer\n);");
        assert_eq!(structure.table_names(), vec!["users"]);

        let structure =
            PostgresParser.parse("CREATE TABLE IF NOT EXISTS billing.\"invoices\" (\n  id integer\n);");
        assert_eq!(structure.table_names(), vec!["billing.invoices"]);
    }

    #[test]
    fn test_body_primary_key_constraint() {
        let sql = [
            "CREATE TABLE memberships (",
            "    user_id integer NOT NULL,",
            "    group_id integer NOT NULL,",
            "    CONSTRAINT memberships_pkey PRIMARY KEY (user_id, group_id)",
            ");",
        ]
        .join("\n");
        let structure = PostgresParser.parse(&sql);
        let table = &structure.tables[0];
        assert_eq!(table.primary_key().len(), 2);
    }

    #[test]
    fn test_alter_table_without_only_and_unnamed() {
        let sql = [
            "CREATE TABLE users (",
            "    id integer NOT NULL",
            ");",
            "ALTER TABLE public.users ADD PRIMARY KEY (id);",
        ]
        .join("\n");
        let structure = PostgresParser.parse(&sql);
        assert!(structure.tables[0].columns[0].is_primary_key);
    }

    #[test]
    fn test_alter_table_owner_is_ignored() {
        let sql = [
            "CREATE TABLE public.users (",
            "    id integer NOT NULL",
            ");",
            "ALTER TABLE public.users OWNER TO postgres;",
        ]
        .join("\n");
        let structure = PostgresParser.parse(&sql);
        assert_eq!(structure.len(), 1);
        assert!(!structure.tables[0].columns[0].is_primary_key);
    }
}
