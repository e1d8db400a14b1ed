//! Structure builder - mutable-by-name phase before the structure is frozen

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::fragment::constraint::TableConstraint;
use crate::schema::{Column, ForeignKey, Structure, Table};

/// Builder for constructing a [`Structure`] while a dump is scanned.
///
/// Tables stay addressable by name until [`StructureBuilder::build`], so
/// constraints issued after a table's creation can still be applied to it.
#[derive(Debug, Default)]
pub struct StructureBuilder {
    tables: Vec<TableBuilder>,
    index: IndexMap<String, usize>,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table in document order. Name lookups resolve to the first
    /// table registered under a name.
    pub fn add_table(&mut self, table: TableBuilder) {
        trace!(
            table = %table.name,
            columns = table.columns.len(),
            "extracted table"
        );
        let position = self.tables.len();
        self.index.entry(table.name.clone()).or_insert(position);
        self.tables.push(table);
    }

    /// Look up a table by name (mutable)
    pub fn table_mut(&mut self, name: &str) -> Option<&mut TableBuilder> {
        let position = *self.index.get(name)?;
        self.tables.get_mut(position)
    }

    /// Apply a constraint declared outside the table body. Unknown tables are
    /// ignored.
    pub fn apply_deferred(&mut self, table: &str, constraint: &TableConstraint) {
        match self.table_mut(table) {
            Some(builder) => builder.apply(constraint),
            None => debug!(table, "ignoring constraint for unknown table"),
        }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Consume the builder and return the frozen structure
    pub fn build(self) -> Structure {
        Structure::new(self.tables.into_iter().map(TableBuilder::build).collect())
    }
}

/// One table under construction: columns first, then constraints by name
#[derive(Debug, Clone)]
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    index: IndexMap<String, usize>,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            index: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push_column(&mut self, column: Column) {
        let position = self.columns.len();
        self.index.entry(column.name.clone()).or_insert(position);
        self.columns.push(column);
    }

    /// Get a column by name (mutable)
    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        let position = *self.index.get(name)?;
        self.columns.get_mut(position)
    }

    /// Flag every listed column that exists as part of the primary key
    pub fn mark_primary_key(&mut self, columns: &[String]) {
        for name in columns {
            match self.column_mut(name) {
                Some(col) => col.is_primary_key = true,
                None => debug!(
                    table = %self.name,
                    column = %name,
                    "primary key names an unknown column"
                ),
            }
        }
    }

    /// Attach a foreign key to its local column, replacing any earlier one
    pub fn attach_foreign_key(&mut self, fk: ForeignKey) {
        match self.column_mut(&fk.column) {
            Some(col) => col.foreign_key = Some(fk),
            None => debug!(
                table = %self.name,
                column = %fk.column,
                "foreign key names an unknown column"
            ),
        }
    }

    pub fn apply(&mut self, constraint: &TableConstraint) {
        match constraint {
            TableConstraint::PrimaryKey(columns) => self.mark_primary_key(columns),
            TableConstraint::ForeignKey(fk) => {
                for key in fk.decompose() {
                    self.attach_foreign_key(key);
                }
            }
        }
    }

    pub fn build(self) -> Table {
        Table {
            name: self.name,
            columns: self.columns,
        }
    }
}
