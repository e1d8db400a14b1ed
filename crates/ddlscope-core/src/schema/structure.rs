//! Structure model - tables, columns and foreign keys recovered from a dump

use serde::{Deserialize, Serialize};

/// Root aggregate: every table found in a dump, in document order of first
/// appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub tables: Vec<Table>,
}

impl Structure {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    /// A structure with no tables ("no schema detected")
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    /// Look up a table by its normalized name. The first definition wins
    /// when a dump defines the same name twice.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Follow a foreign key to the table it points at
    pub fn referenced_table(&self, fk: &ForeignKey) -> Option<&Table> {
        self.table(&fk.references_table)
    }

    /// Every column, across all tables, whose foreign key targets `name`
    pub fn referencing(&self, name: &str) -> Vec<(&Table, &Column)> {
        self.tables
            .iter()
            .flat_map(|table| {
                table
                    .columns
                    .iter()
                    .filter(|col| {
                        col.foreign_key
                            .as_ref()
                            .is_some_and(|fk| fk.references_table == name)
                    })
                    .map(move |col| (table, col))
            })
            .collect()
    }

    /// Get all table names
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}

impl<'a> IntoIterator for &'a Structure {
    type Item = &'a Table;
    type IntoIter = std::slice::Iter<'a, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

/// Table definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Dialect-normalized name: quoting and default-schema prefix removed
    pub name: String,
    /// Columns in definition order
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Get a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Columns flagged as part of the primary key
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_primary_key).collect()
    }

    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.columns.iter().filter_map(|c| c.foreign_key.as_ref())
    }

    /// Get all column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    /// Type tokens as written, minus inline PRIMARY KEY / REFERENCES / NOT NULL
    pub declared_type: String,
    pub is_primary_key: bool,
    pub is_nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<ForeignKey>,
}

impl Column {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
            is_primary_key: false,
            is_nullable: true,
            default_value: None,
            foreign_key: None,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_key = Some(fk);
        self
    }
}

/// Single-column foreign key; composite keys are stored one per column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub column: String,
    pub references_table: String,
    pub references_column: String,
}

impl ForeignKey {
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            references_table: references_table.into(),
            references_column: references_column.into(),
        }
    }
}

impl std::fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {}.{}",
            self.column, self.references_table, self.references_column
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Structure {
        Structure::new(vec![
            Table::new("users").with_column(Column::new("id", "serial").primary_key()),
            Table::new("orders")
                .with_column(Column::new("id", "serial").primary_key())
                .with_column(
                    Column::new("user_id", "integer")
                        .with_foreign_key(ForeignKey::new("user_id", "users", "id")),
                ),
        ])
    }

    #[test]
    fn test_table_lookup() {
        let structure = sample();
        assert_eq!(structure.len(), 2);
        assert!(structure.table("orders").is_some());
        assert!(structure.table("missing").is_none());
        assert_eq!(structure.table_names(), vec!["users", "orders"]);
    }

    #[test]
    fn test_navigate_foreign_key() {
        let structure = sample();
        let orders = structure.table("orders").unwrap();
        let fk = orders.foreign_keys().next().unwrap();
        let target = structure.referenced_table(fk).unwrap();
        assert_eq!(target.name, "users");

        let incoming = structure.referencing("users");
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].0.name, "orders");
        assert_eq!(incoming[0].1.name, "user_id");
    }

    #[test]
    fn test_column_defaults() {
        let col = Column::new("id", "int");
        assert!(col.is_nullable);
        assert!(!col.is_primary_key);
        assert_eq!(col.default_value, None);
    }

    #[test]
    fn test_primary_key_columns() {
        let structure = sample();
        let users = structure.table("users").unwrap();
        assert_eq!(users.primary_key().len(), 1);
        assert_eq!(users.column_names(), vec!["id"]);
    }
}
