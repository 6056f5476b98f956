//! Schema capture for dump files.
//!
//! This module provides:
//! - Data models for table schemas and column definitions
//! - A registry that tracks table definitions as a dump streams past
//! - A tally of declared column types for diagnostics

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, warn};

/// Strip a size/precision suffix and modifiers from a declared SQL type:
/// `varchar(255)` becomes `varchar`, `int(11) unsigned` becomes `int`.
pub fn bare_type_name(declared: &str) -> &str {
    let trimmed = declared.trim();
    let end = trimmed
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

/// Column definition within a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
    /// Position in declaration order (1-based)
    pub position: usize,
    /// Column name
    pub name: String,
    /// Declared type including any size suffix, e.g. `varchar(255)`
    pub declared_type: String,
}

impl ColumnDef {
    /// Declared type without its size suffix
    pub fn type_name(&self) -> &str {
        bare_type_name(&self.declared_type)
    }

    /// 0-based index of this column within a row tuple
    pub fn index(&self) -> usize {
        self.position - 1
    }
}

/// Table schema as captured from a CREATE TABLE block
#[derive(Debug, Clone, Serialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,
    /// Column definitions in order
    pub columns: Vec<ColumnDef>,
    /// Set when the `) ENGINE=...` terminator has been seen
    sealed: bool,
}

impl TableSchema {
    /// Create a new empty, unsealed table schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            sealed: false,
        }
    }

    /// Get a column by name (case-insensitive, as MySQL column names are)
    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Whether the table definition has been closed
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn push_column(&mut self, name: &str, declared_type: &str) -> &ColumnDef {
        let position = self.columns.len() + 1;
        self.columns.push(ColumnDef {
            position,
            name: name.to_string(),
            declared_type: declared_type.to_string(),
        });
        &self.columns[position - 1]
    }
}

/// Registry of table schemas for one pass over a dump.
///
/// At most one table is open for column capture at a time. Sealed schemas
/// stay available for the rest of the pass so later INSERTs can resolve
/// column positions.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: AHashMap<String, TableSchema>,
    /// Table names in order of first definition
    order: Vec<String>,
    current: Option<String>,
    type_tally: AHashMap<String, u64>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a table for column capture.
    ///
    /// A table that is defined twice in one dump starts over with an empty
    /// column list. A table still open from a previous CREATE TABLE is
    /// sealed first.
    pub fn begin_table(&mut self, name: &str) {
        if let Some(open) = self.current.take() {
            warn!(table = %open, "table definition not terminated before next CREATE TABLE");
            if let Some(table) = self.tables.get_mut(&open) {
                table.sealed = true;
            }
        }

        if self.tables.contains_key(name) {
            warn!(table = %name, "table defined more than once; discarding previous schema");
        } else {
            self.order.push(name.to_string());
        }

        self.tables.insert(name.to_string(), TableSchema::new(name));
        self.current = Some(name.to_string());
        debug!(table = %name, "table definition starts");
    }

    /// Append a column to the open table. Returns `None` when no table is
    /// open.
    pub fn add_column(&mut self, name: &str, declared_type: &str) -> Option<&ColumnDef> {
        let current = self.current.as_ref()?;
        let table = self.tables.get_mut(current)?;

        *self
            .type_tally
            .entry(declared_type.to_string())
            .or_insert(0) += 1;

        let column = table.push_column(name, declared_type);
        debug!(
            table = %current,
            position = column.position,
            column = %column.name,
            declared_type = %column.declared_type,
            "column captured"
        );
        Some(column)
    }

    /// Seal the open table and return it. No-op when nothing is open.
    pub fn end_table(&mut self) -> Option<&TableSchema> {
        let name = self.current.take()?;
        let table = self.tables.get_mut(&name)?;
        table.sealed = true;
        debug!(table = %name, columns = table.columns.len(), "table definition ends");
        Some(table)
    }

    /// Look up a table schema by name
    pub fn lookup(&self, table: &str) -> Option<&TableSchema> {
        self.tables.get(table)
    }

    /// Name of the table currently open for column capture
    pub fn current_table(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Whether a table definition is currently open
    pub fn in_table_def(&self) -> bool {
        self.current.is_some()
    }

    /// Iterate over tables in order of definition
    pub fn iter(&self) -> impl Iterator<Item = &TableSchema> {
        self.order.iter().filter_map(|name| self.tables.get(name))
    }

    /// Declared types and how often each appeared, most frequent first
    pub fn type_frequency(&self) -> Vec<(String, u64)> {
        let mut tally: Vec<(String, u64)> = self
            .type_tally
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tally
    }

    /// Number of tables seen
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
