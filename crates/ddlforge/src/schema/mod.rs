//! The abstract schema model: dialect-neutral, plain-value representations of
//! schemas, tables, columns, constraints and indexes, plus the builders that
//! assemble them.
//!
//! Model values carry no connection state and no back-references; a table's
//! identity is its name. Everything serializes with serde so callers (e.g. a
//! migration layer) can persist snapshots.

mod column;
mod constraint;
mod data_type;
mod expression;
mod index;
mod table;

pub use column::{Column, ColumnOption, DefaultClause, ReferSpec};
pub use constraint::{
    CheckConstraint, Constraint, ForeignKeyConstraint, MatchType, ReferentialAction,
    UniqueConstraint, UniqueKind,
};
pub use data_type::{DataType, TypeOptions};
pub use expression::{Expression, Scalar};
pub use index::Index;
pub use table::{Table, TableBuilder};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};

/// Generates the deterministic name for an unnamed constraint or index:
/// table name, type tag and column list joined with underscores, dashes in
/// the tag normalized to underscores.
///
/// The same (table, tag, columns) triple always yields the same identifier;
/// the analyzer leans on this to recognize constraints across a round trip.
#[must_use]
pub fn generate_name<S: AsRef<str>>(table: &str, tag: &str, columns: &[S]) -> String {
    let mut parts = vec![table.to_string(), tag.replace('-', "_")];
    parts.extend(columns.iter().map(|c| c.as_ref().to_string()));
    parts.join("_")
}

/// Option bag of a schema; currently only the originating connection
/// descriptor, carried opaquely for the connection collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOptions {
    /// Opaque connection descriptor this schema originated from.
    pub connection: Option<String>,
}

/// A dialect-neutral database schema: named tables and schema-level indexes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema name.
    pub name: String,
    tables: BTreeMap<String, Table>,
    indexes: BTreeMap<String, Index>,
    /// Option bag.
    pub options: SchemaOptions,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::construction("schema", "a schema requires a name"));
        }
        Ok(Self {
            name,
            tables: BTreeMap::new(),
            indexes: BTreeMap::new(),
            options: SchemaOptions::default(),
        })
    }

    /// Creates a schema holding the given tables.
    pub fn with_tables(name: impl Into<String>, tables: Vec<Table>) -> Result<Self> {
        let mut schema = Self::new(name)?;
        for table in tables {
            schema.insert_table(table)?;
        }
        Ok(schema)
    }

    /// Adds a table, rejecting duplicate names.
    pub fn insert_table(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(&table.name) {
            return Err(DdlError::construction(
                "schema",
                format!("duplicate table '{}' in schema '{}'", table.name, self.name),
            ));
        }
        self.tables.insert(table.name.clone(), table);
        Ok(())
    }

    /// Adds a schema-level index, rejecting duplicate names.
    pub fn insert_index(&mut self, index: Index) -> Result<()> {
        if self.indexes.contains_key(&index.name) {
            return Err(DdlError::construction(
                "schema",
                format!("duplicate index '{}' in schema '{}'", index.name, self.name),
            ));
        }
        self.indexes.insert(index.name.clone(), index);
        Ok(())
    }

    /// Tables by name.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Looks up a table by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Schema-level indexes by name.
    pub fn indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.values()
    }
}
