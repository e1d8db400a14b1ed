//! Fragment utilities shared by the dialect parsers
//!
//! A table body is cut into one fragment per definition line. Column
//! fragments go through [`column`], constraint fragments through
//! [`constraint`].

pub mod column;
pub mod constraint;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dialect::SqlDialect;

/// One identifier: double-quoted, back-quoted, or bare
pub(crate) const IDENT: &str = r#"(?:"[^"]+"|`[^`]+`|[\w$]+)"#;

/// An identifier with an optional schema/database qualifier
pub(crate) static QUALIFIED_IDENT: Lazy<String> = Lazy::new(|| format!(r"{IDENT}(?:\.{IDENT})?"));

static DEFINITION_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\r?\n").expect("valid separator pattern"));

/// MySQL dumps quote every identifier, so a bare index keyword always
/// opens an index definition.
static MYSQL_CONSTRAINT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:PRIMARY|UNIQUE|KEY|CONSTRAINT|FOREIGN|CHECK|INDEX|FULLTEXT|SPATIAL)\b",
    )
    .expect("valid mysql constraint keyword pattern")
});

/// `index` and `exclude` are valid bare column names in PostgreSQL, so
/// EXCLUDE only counts when followed by its constraint shape.
static POSTGRES_CONSTRAINT_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(?:PRIMARY|UNIQUE|KEY|CONSTRAINT|FOREIGN|CHECK)\b|EXCLUDE\s*(?:USING\b|\())",
    )
    .expect("valid postgres constraint keyword pattern")
});

/// Split a table body into trimmed definition fragments.
///
/// Definitions are separated by a comma followed by a line break, so a
/// definition spread over several physical lines stays one fragment (and
/// will usually fail to match as a column). Pure `--` comment lines are
/// dropped and empty fragments skipped.
pub fn split_definitions(body: &str) -> Vec<String> {
    DEFINITION_SEPARATOR
        .split(body)
        .map(|fragment| {
            fragment
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        })
        .filter(|fragment| !fragment.is_empty())
        .collect()
}

/// Whether a fragment opens a table-level constraint in `dialect`
pub fn is_constraint_line(fragment: &str, dialect: SqlDialect) -> bool {
    let keyword = match dialect {
        SqlDialect::MySQL => &*MYSQL_CONSTRAINT_KEYWORD,
        SqlDialect::PostgreSQL => &*POSTGRES_CONSTRAINT_KEYWORD,
    };
    keyword.is_match(fragment.trim_start())
}

/// Remove identifier quoting (`"` and `` ` ``)
pub fn unquote(ident: &str) -> String {
    ident.trim().chars().filter(|c| *c != '"' && *c != '`').collect()
}

/// Split a parenthesized identifier list (`"a", b, `c`(10) DESC`) into names
pub fn split_identifier_list(list: &str) -> Vec<String> {
    list.split(',')
        .filter_map(|item| {
            let name = leading_identifier(item.trim())?;
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

/// The identifier at the start of `item`, ignoring anything after it
/// (index prefix lengths, sort order)
fn leading_identifier(item: &str) -> Option<String> {
    let mut chars = item.chars();
    match chars.next()? {
        quote @ ('"' | '`') => {
            let rest = chars.as_str();
            let end = rest.find(quote).unwrap_or(rest.len());
            Some(rest[..end].to_string())
        }
        _ => {
            let end = item
                .find(|c: char| c.is_whitespace() || c == '(')
                .unwrap_or(item.len());
            Some(item[..end].to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_definitions() {
        let body = "\n  `id` int,\n  `name` varchar(10),\n  PRIMARY KEY (`id`)\n";
        let fragments = split_definitions(body);
        assert_eq!(
            fragments,
            vec!["`id` int", "`name` varchar(10)", "PRIMARY KEY (`id`)"]
        );
    }

    #[test]
    fn test_split_definitions_trailing_comma() {
        let fragments = split_definitions("\n  id serial,\n");
        assert_eq!(fragments, vec!["id serial"]);
    }

    #[test]
    fn test_split_keeps_inline_commas() {
        let fragments = split_definitions("\n  total numeric(10,2),\n  id int\n");
        assert_eq!(fragments, vec!["total numeric(10,2)", "id int"]);
    }

    #[test]
    fn test_split_drops_comment_lines() {
        let fragments = split_definitions("\n  -- the key\n  id int,\n  name text\n");
        assert_eq!(fragments, vec!["id int", "name text"]);
    }

    #[test]
    fn test_constraint_keywords() {
        let mysql = |fragment| is_constraint_line(fragment, SqlDialect::MySQL);
        assert!(mysql("PRIMARY KEY (`id`)"));
        assert!(mysql("  CONSTRAINT fk FOREIGN KEY (a) REFERENCES b(c)"));
        assert!(mysql("unique key `idx` (`email`)"));
        assert!(mysql("KEY `idx_user` (`user_id`)"));
        assert!(mysql("FULLTEXT KEY `idx_body` (`body`)"));
        assert!(mysql("INDEX `idx_user` (`user_id`)"));
        assert!(!mysql("primary_color varchar(10)"));
        assert!(!mysql("`key_name` varchar(10)"));
        assert!(!mysql("`index` int"));
        assert!(!mysql("id int"));
    }

    #[test]
    fn test_postgres_keyword_named_columns() {
        let postgres = |fragment| is_constraint_line(fragment, SqlDialect::PostgreSQL);
        assert!(postgres("CONSTRAINT users_pkey PRIMARY KEY (id)"));
        assert!(postgres("EXCLUDE USING gist (room WITH =, during WITH &&)"));
        assert!(postgres("EXCLUDE (room WITH =)"));
        assert!(!postgres("index integer NOT NULL"));
        assert!(!postgres("index numeric(10,2)"));
        assert!(!postgres("exclude boolean"));
        assert!(!postgres("fulltext text"));
        assert!(!postgres("spatial boolean"));
    }

    #[test]
    fn test_split_identifier_list() {
        assert_eq!(split_identifier_list("`id`"), vec!["id"]);
        assert_eq!(
            split_identifier_list(r#""tenant_id", id"#),
            vec!["tenant_id", "id"]
        );
        assert_eq!(
            split_identifier_list("`name`(10), created_at DESC"),
            vec!["name", "created_at"]
        );
        assert_eq!(split_identifier_list(r#""first name""#), vec!["first name"]);
    }
}
