//! Output formatting

use ddlscope_core::{Column, SqlDialect, Structure, Table};
use miette::{IntoDiagnostic, Result};

use crate::args::OutputFormat;

/// Output formatter for extracted structures
pub struct OutputFormatter {
    format: OutputFormat,
    file_name: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, file_name: String) -> Self {
        Self { format, file_name }
    }

    /// Print a structure as a table/column tree or JSON
    pub fn print_structure(
        &self,
        structure: &Structure,
        dialect: Option<SqlDialect>,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                print!("{}", self.render_structure(structure, dialect));
                Ok(())
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "file": self.file_name,
                    "dialect": dialect,
                    "tables": structure.tables,
                });
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
                Ok(())
            }
        }
    }

    /// Print the foreign keys leaving `table` and those pointing at it
    pub fn print_refs(&self, structure: &Structure, table: &Table) -> Result<()> {
        let incoming = structure.referencing(&table.name);
        match self.format {
            OutputFormat::Human => {
                println!("{} ({})", table.name, self.file_name);
                println!("  references:");
                for fk in table.foreign_keys() {
                    let marker = if structure.referenced_table(fk).is_some() {
                        ""
                    } else {
                        " (not in dump)"
                    };
                    println!("    {}{}", fk, marker);
                }
                println!("  referenced by:");
                for (source, column) in &incoming {
                    println!("    {}.{}", source.name, column.name);
                }
                Ok(())
            }
            OutputFormat::Json => {
                let outgoing: Vec<_> = table.foreign_keys().collect();
                let incoming: Vec<_> = incoming
                    .iter()
                    .map(|(source, column)| {
                        serde_json::json!({
                            "table": source.name,
                            "foreignKey": column.foreign_key,
                        })
                    })
                    .collect();
                let output = serde_json::json!({
                    "file": self.file_name,
                    "table": table.name,
                    "references": outgoing,
                    "referencedBy": incoming,
                });
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
                Ok(())
            }
        }
    }

    fn render_structure(&self, structure: &Structure, dialect: Option<SqlDialect>) -> String {
        let dialect = dialect.map_or_else(|| "unknown".to_string(), |d| d.to_string());
        let mut out = format!("{} ({})\n", self.file_name, dialect);
        if structure.is_empty() {
            out.push_str("  no schema detected\n");
            return out;
        }
        for table in structure {
            out.push_str(&format!("  Table: {}\n", table.name));
            for column in &table.columns {
                out.push_str(&format!("    - {}\n", describe_column(column)));
            }
        }
        out
    }
}

fn describe_column(column: &Column) -> String {
    let mut parts = vec![column.name.clone(), column.declared_type.clone()];
    if column.is_primary_key {
        parts.push("PK".to_string());
    }
    if !column.is_nullable {
        parts.push("NOT NULL".to_string());
    }
    if let Some(default) = &column.default_value {
        parts.push(format!("DEFAULT {}", default));
    }
    if let Some(fk) = &column.foreign_key {
        parts.push(format!("-> {}.{}", fk.references_table, fk.references_column));
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlscope_core::ForeignKey;

    #[test]
    fn test_describe_column() {
        let column = Column::new("user_id", "bigint")
            .not_null()
            .with_default("0")
            .with_foreign_key(ForeignKey::new("user_id", "users", "id"));
        assert_eq!(
            describe_column(&column),
            "user_id bigint NOT NULL DEFAULT 0 -> users.id"
        );
    }

    #[test]
    fn test_render_empty_structure() {
        let formatter = OutputFormatter::new(OutputFormat::Human, "db/structure.sql".to_string());
        assert_eq!(
            formatter.render_structure(&Structure::empty(), None),
            "db/structure.sql (unknown)\n  no schema detected\n"
        );
    }

    #[test]
    fn test_render_tree() {
        let structure = Structure::new(vec![
            Table::new("users").with_column(Column::new("id", "int").primary_key()),
        ]);
        let formatter = OutputFormatter::new(OutputFormat::Human, "dump.sql".to_string());
        assert_eq!(
            formatter.render_structure(&structure, Some(SqlDialect::MySQL)),
            "dump.sql (mysql)\n  Table: users\n    - id int PK\n"
        );
    }
}
