//! Table model and the composable table builder.
//!
//! The builder appends elements in call order; the element order you write is
//! the element order that compiles. Column-defining calls synthesize
//! table-level constraints when the matching option is present, so
//!
//! ```
//! use ddlforge::schema::{ColumnOption, TableBuilder};
//!
//! let table = TableBuilder::new("foo")
//!     .integer("bar", &[ColumnOption::Unique])
//!     .build()
//!     .unwrap();
//!
//! assert!(table.constraint("foo_unique_bar").is_some());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{DdlError, Result};

use super::column::{Column, ColumnOption, DefaultClause, ReferSpec};
use super::constraint::{
    CheckConstraint, Constraint, ForeignKeyConstraint, UniqueConstraint, UniqueKind,
};
use super::data_type::DataType;
use super::generate_name;
use super::index::Index;

/// A dialect-neutral table: named columns, constraints and indexes, with
/// unique names per kind and stable declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,
    columns: BTreeMap<String, Column>,
    column_order: Vec<String>,
    constraints: BTreeMap<String, Constraint>,
    constraint_order: Vec<String>,
    indexes: BTreeMap<String, Index>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DdlError::construction("table", "a table requires a name"));
        }
        Ok(Self {
            name,
            columns: BTreeMap::new(),
            column_order: Vec::new(),
            constraints: BTreeMap::new(),
            constraint_order: Vec::new(),
            indexes: BTreeMap::new(),
        })
    }

    /// Adds a column, rejecting duplicate names.
    pub fn insert_column(&mut self, column: Column) -> Result<()> {
        if self.columns.contains_key(&column.name) {
            return Err(DdlError::construction(
                "table",
                format!("duplicate column '{}' in table '{}'", column.name, self.name),
            ));
        }
        self.column_order.push(column.name.clone());
        self.columns.insert(column.name.clone(), column);
        Ok(())
    }

    /// Adds a constraint, rejecting duplicate names.
    pub fn insert_constraint(&mut self, constraint: Constraint) -> Result<()> {
        let name = constraint.name().to_string();
        if name.is_empty() {
            return Err(DdlError::construction(
                "constraint",
                "a constraint requires a name",
            ));
        }
        if self.constraints.contains_key(&name) {
            return Err(DdlError::construction(
                "table",
                format!("duplicate constraint '{name}' in table '{}'", self.name),
            ));
        }
        if let Constraint::ForeignKey(fk) = &constraint {
            fk.validate()?;
        }
        self.constraint_order.push(name.clone());
        self.constraints.insert(name, constraint);
        Ok(())
    }

    /// Adds an index, rejecting duplicate names.
    pub fn insert_index(&mut self, index: Index) -> Result<()> {
        if self.indexes.contains_key(&index.name) {
            return Err(DdlError::construction(
                "table",
                format!("duplicate index '{}' in table '{}'", index.name, self.name),
            ));
        }
        self.indexes.insert(index.name.clone(), index);
        Ok(())
    }

    /// Columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order.iter().filter_map(|n| self.columns.get(n))
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Constraints in declaration order.
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraint_order
            .iter()
            .filter_map(|n| self.constraints.get(n))
    }

    /// Looks up a constraint by name.
    #[must_use]
    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.get(name)
    }

    /// Indexes by name.
    pub fn indexes(&self) -> impl Iterator<Item = &Index> {
        self.indexes.values()
    }

    /// Looks up an index by name.
    #[must_use]
    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }
}

/// Composable table builder. Elements are appended in call order; the first
/// construction error is remembered and surfaced by [`TableBuilder::build`].
#[derive(Debug)]
pub struct TableBuilder {
    table: Result<Table>,
}

impl TableBuilder {
    /// Starts building a table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: Table::new(name),
        }
    }

    fn apply(mut self, f: impl FnOnce(&mut Table) -> Result<()>) -> Self {
        if let Ok(table) = &mut self.table {
            if let Err(err) = f(table) {
                self.table = Err(err);
            }
        }
        self
    }

    /// Finishes the build, surfacing the first construction error.
    pub fn build(self) -> Result<Table> {
        self.table
    }

    /// Adds a column with an explicit (possibly absent) data type, applying
    /// the options and synthesizing unique / primary-key / foreign-key
    /// constraints when requested.
    #[must_use]
    pub fn column(
        self,
        name: &str,
        data_type: Option<DataType>,
        options: &[ColumnOption],
    ) -> Self {
        let name = name.to_string();
        let options = options.to_vec();
        self.apply(move |table| {
            let mut column = Column::new(name.clone())?;
            let mut data_type = data_type;
            let mut synthesized: Vec<Constraint> = Vec::new();

            for option in options {
                match option {
                    ColumnOption::NotNull => column.not_null = true,
                    ColumnOption::Null => column.not_null = false,
                    ColumnOption::AutoInc => column.auto_inc = true,
                    ColumnOption::Default(expr) => {
                        column.default = Some(DefaultClause::Value(expr));
                    }
                    ColumnOption::DropDefault => column.default = Some(DefaultClause::Drop),
                    ColumnOption::Other(clause) => column.others.push(clause),
                    ColumnOption::Encoding(enc) => match &mut data_type {
                        Some(dt) => dt.options.encoding = Some(enc),
                        None => {
                            return Err(DdlError::construction(
                                "column",
                                format!("option 'encoding' on type-less column '{name}'"),
                            ));
                        }
                    },
                    ColumnOption::Collate(collation) => match &mut data_type {
                        Some(dt) => dt.options.collate = Some(collation),
                        None => {
                            return Err(DdlError::construction(
                                "column",
                                format!("option 'collate' on type-less column '{name}'"),
                            ));
                        }
                    },
                    ColumnOption::TimeZone => match &mut data_type {
                        Some(dt) => dt.options.time_zone = true,
                        None => {
                            return Err(DdlError::construction(
                                "column",
                                format!("option 'time-zone' on type-less column '{name}'"),
                            ));
                        }
                    },
                    ColumnOption::Unique => {
                        synthesized.push(Constraint::Unique(UniqueConstraint {
                            name: generate_name(&table.name, UniqueKind::Unique.tag(), &[&name]),
                            kind: UniqueKind::Unique,
                            columns: vec![name.clone()],
                        }));
                    }
                    ColumnOption::PrimaryKey => {
                        synthesized.push(Constraint::Unique(UniqueConstraint {
                            name: generate_name(
                                &table.name,
                                UniqueKind::PrimaryKey.tag(),
                                &[&name],
                            ),
                            kind: UniqueKind::PrimaryKey,
                            columns: vec![name.clone()],
                        }));
                    }
                    ColumnOption::Refer(spec) => {
                        synthesized.push(Constraint::ForeignKey(ForeignKeyConstraint {
                            name: generate_name(&table.name, "fkey", &[&name]),
                            columns: vec![name.clone()],
                            parent_table: spec.table,
                            parent_columns: spec.columns,
                            match_type: spec.match_type,
                            on_delete: spec.on_delete,
                            on_update: spec.on_update,
                        }));
                    }
                }
            }

            column.data_type = data_type;
            table.insert_column(column)?;
            for constraint in synthesized {
                table.insert_constraint(constraint)?;
            }
            Ok(())
        })
    }

    fn typed(self, name: &str, type_name: &str, args: Vec<i64>, options: &[ColumnOption]) -> Self {
        let data_type = match DataType::new(type_name) {
            Ok(dt) => dt.with_args(args),
            Err(err) => return self.apply(|_| Err(err)),
        };
        self.column(name, Some(data_type), options)
    }

    // --- simple no-arg types -------------------------------------------------

    /// INTEGER column.
    #[must_use]
    pub fn integer(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "integer", vec![], options)
    }

    /// SMALLINT column.
    #[must_use]
    pub fn smallint(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "smallint", vec![], options)
    }

    /// BIGINT column.
    #[must_use]
    pub fn bigint(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "bigint", vec![], options)
    }

    /// REAL column.
    #[must_use]
    pub fn real(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "real", vec![], options)
    }

    /// DOUBLE PRECISION column.
    #[must_use]
    pub fn double_precision(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "double-precision", vec![], options)
    }

    /// BOOLEAN column.
    #[must_use]
    pub fn boolean(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "boolean", vec![], options)
    }

    /// DATE column.
    #[must_use]
    pub fn date(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "date", vec![], options)
    }

    /// TEXT column.
    #[must_use]
    pub fn text(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "text", vec![], options)
    }

    /// BLOB column.
    #[must_use]
    pub fn blob(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "blob", vec![], options)
    }

    /// CLOB column.
    #[must_use]
    pub fn clob(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "clob", vec![], options)
    }

    /// NTEXT column.
    #[must_use]
    pub fn ntext(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "ntext", vec![], options)
    }

    /// NCLOB column.
    #[must_use]
    pub fn nclob(self, name: &str, options: &[ColumnOption]) -> Self {
        self.typed(name, "nclob", vec![], options)
    }

    // --- numeric-like: optional precision, optional scale --------------------

    fn numeric_like(
        self,
        name: &str,
        type_name: &str,
        precision: Option<u32>,
        scale: Option<u32>,
        options: &[ColumnOption],
    ) -> Self {
        if scale.is_some() && precision.is_none() {
            let name = name.to_string();
            return self.apply(move |_| {
                Err(DdlError::construction(
                    "column",
                    format!("column '{name}' specifies a scale without a precision"),
                ))
            });
        }
        let args = precision
            .into_iter()
            .chain(scale)
            .map(i64::from)
            .collect();
        self.typed(name, type_name, args, options)
    }

    /// NUMERIC column with optional precision and scale.
    #[must_use]
    pub fn numeric(
        self,
        name: &str,
        precision: Option<u32>,
        scale: Option<u32>,
        options: &[ColumnOption],
    ) -> Self {
        self.numeric_like(name, "numeric", precision, scale, options)
    }

    /// DECIMAL column with optional precision and scale.
    #[must_use]
    pub fn decimal(
        self,
        name: &str,
        precision: Option<u32>,
        scale: Option<u32>,
        options: &[ColumnOption],
    ) -> Self {
        self.numeric_like(name, "decimal", precision, scale, options)
    }

    // --- optional precision --------------------------------------------------

    /// FLOAT column with optional precision.
    #[must_use]
    pub fn float(self, name: &str, precision: Option<u32>, options: &[ColumnOption]) -> Self {
        let args = precision.map(i64::from).into_iter().collect();
        self.typed(name, "float", args, options)
    }

    /// TIME column with optional precision.
    #[must_use]
    pub fn time(self, name: &str, precision: Option<u32>, options: &[ColumnOption]) -> Self {
        let args = precision.map(i64::from).into_iter().collect();
        self.typed(name, "time", args, options)
    }

    /// TIMESTAMP column with optional precision.
    #[must_use]
    pub fn timestamp(self, name: &str, precision: Option<u32>, options: &[ColumnOption]) -> Self {
        let args = precision.map(i64::from).into_iter().collect();
        self.typed(name, "timestamp", args, options)
    }

    /// TIME WITH TIME ZONE column with optional precision.
    #[must_use]
    pub fn time_tz(self, name: &str, precision: Option<u32>, options: &[ColumnOption]) -> Self {
        let mut options = options.to_vec();
        options.push(ColumnOption::TimeZone);
        self.time(name, precision, &options)
    }

    /// TIMESTAMP WITH TIME ZONE column with optional precision.
    #[must_use]
    pub fn timestamp_tz(
        self,
        name: &str,
        precision: Option<u32>,
        options: &[ColumnOption],
    ) -> Self {
        let mut options = options.to_vec();
        options.push(ColumnOption::TimeZone);
        self.timestamp(name, precision, &options)
    }

    // --- optional length -----------------------------------------------------

    /// CHAR column with optional length.
    #[must_use]
    pub fn char(self, name: &str, length: Option<u32>, options: &[ColumnOption]) -> Self {
        let args = length.map(i64::from).into_iter().collect();
        self.typed(name, "char", args, options)
    }

    /// NCHAR column with optional length.
    #[must_use]
    pub fn nchar(self, name: &str, length: Option<u32>, options: &[ColumnOption]) -> Self {
        let args = length.map(i64::from).into_iter().collect();
        self.typed(name, "nchar", args, options)
    }

    /// BINARY column with optional length.
    #[must_use]
    pub fn binary(self, name: &str, length: Option<u32>, options: &[ColumnOption]) -> Self {
        let args = length.map(i64::from).into_iter().collect();
        self.typed(name, "binary", args, options)
    }

    // --- mandatory length ----------------------------------------------------

    /// VARCHAR column; the length is mandatory.
    #[must_use]
    pub fn varchar(self, name: &str, length: u32, options: &[ColumnOption]) -> Self {
        self.typed(name, "varchar", vec![i64::from(length)], options)
    }

    /// NVARCHAR column; the length is mandatory.
    #[must_use]
    pub fn nvarchar(self, name: &str, length: u32, options: &[ColumnOption]) -> Self {
        self.typed(name, "nvarchar", vec![i64::from(length)], options)
    }

    /// VARBINARY column; the length is mandatory.
    #[must_use]
    pub fn varbinary(self, name: &str, length: u32, options: &[ColumnOption]) -> Self {
        self.typed(name, "varbinary", vec![i64::from(length)], options)
    }

    // --- table-level elements ------------------------------------------------

    /// Multi-column PRIMARY KEY constraint with a generated name.
    #[must_use]
    pub fn primary_key(self, columns: &[&str]) -> Self {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        self.apply(move |table| {
            let name = generate_name(&table.name, UniqueKind::PrimaryKey.tag(), &columns);
            table.insert_constraint(Constraint::Unique(UniqueConstraint {
                name,
                kind: UniqueKind::PrimaryKey,
                columns,
            }))
        })
    }

    /// Multi-column UNIQUE constraint with a generated name.
    #[must_use]
    pub fn unique(self, columns: &[&str]) -> Self {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        self.apply(move |table| {
            let name = generate_name(&table.name, UniqueKind::Unique.tag(), &columns);
            table.insert_constraint(Constraint::Unique(UniqueConstraint {
                name,
                kind: UniqueKind::Unique,
                columns,
            }))
        })
    }

    /// Multi-column FOREIGN KEY constraint with a generated name.
    #[must_use]
    pub fn foreign_key(self, columns: &[&str], spec: ReferSpec) -> Self {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        self.apply(move |table| {
            let name = generate_name(&table.name, "fkey", &columns);
            table.insert_constraint(Constraint::ForeignKey(ForeignKeyConstraint {
                name,
                columns,
                parent_table: spec.table,
                parent_columns: spec.columns,
                match_type: spec.match_type,
                on_delete: spec.on_delete,
                on_update: spec.on_update,
            }))
        })
    }

    /// Named CHECK constraint over a structured condition.
    #[must_use]
    pub fn check(self, name: &str, condition: crate::schema::Expression) -> Self {
        let name = name.to_string();
        self.apply(move |table| {
            table.insert_constraint(Constraint::Check(CheckConstraint::new(name, condition)?))
        })
    }

    /// Index over the given columns with a generated name.
    #[must_use]
    pub fn index(self, columns: &[&str], unique: bool) -> Self {
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        self.apply(move |table| {
            let name = generate_name(&table.name, "index", &columns);
            let cols: Vec<&str> = columns.iter().map(String::as_str).collect();
            let mut index = Index::new(name, table.name.clone(), &cols)?;
            index.unique = unique;
            table.insert_index(index)
        })
    }
}
