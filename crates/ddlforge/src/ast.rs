//! The intermediate representation between the schema model and rendered SQL.
//!
//! Every statement carries the target [`Dialect`] tag and the enclosing
//! schema name (its render context); nodes are built fresh per compile call
//! and discarded after rendering.

use crate::dialect::Dialect;
use crate::schema::{Expression, MatchType, ReferentialAction, UniqueKind};

/// Kind of object a drop statement targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    /// A schema.
    Schema,
    /// A table.
    Table,
    /// An index.
    Index,
}

impl ObjectType {
    /// SQL keyword for the object kind.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Schema => "SCHEMA",
            Self::Table => "TABLE",
            Self::Index => "INDEX",
        }
    }
}

/// Drop behavior keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    /// CASCADE: drop dependent objects too (emulated on dialects without
    /// native support).
    Cascade,
    /// RESTRICT: refuse if dependent objects exist.
    Restrict,
}

impl DropBehavior {
    /// SQL keyword for the behavior.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::Restrict => "RESTRICT",
        }
    }
}

/// A lowered data-type clause.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTypeClause {
    /// Symbolic type name (dialects may alias it at render time).
    pub name: String,
    /// Numeric type arguments.
    pub args: Vec<i64>,
    /// CHARACTER SET option.
    pub encoding: Option<String>,
    /// COLLATE option.
    pub collate: Option<String>,
    /// WITH TIME ZONE flag.
    pub time_zone: bool,
}

/// A lowered column default.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultDef {
    /// `DEFAULT <expr>`.
    Value(Expression),
    /// Drop an existing default; meaningful only inside alter-MODIFY.
    Drop,
}

/// A lowered column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Data-type clause, absent for type-less columns.
    pub data_type: Option<DataTypeClause>,
    /// Default clause.
    pub default: Option<DefaultDef>,
    /// Auto-increment flag.
    pub auto_inc: bool,
    /// NOT NULL flag.
    pub not_null: bool,
    /// Verbatim trailing clause strings.
    pub others: Vec<String>,
}

/// A lowered unique / primary-key constraint definition.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueDef {
    /// Constraint name.
    pub name: String,
    /// UNIQUE or PRIMARY KEY.
    pub kind: UniqueKind,
    /// Ordered columns.
    pub columns: Vec<String>,
}

/// A lowered foreign-key constraint definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyDef {
    /// Constraint name.
    pub name: String,
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub parent_table: String,
    /// Referenced columns (already resolved, never empty).
    pub parent_columns: Vec<String>,
    /// Optional MATCH clause.
    pub match_type: Option<MatchType>,
    /// Optional ON DELETE action.
    pub on_delete: Option<ReferentialAction>,
    /// Optional ON UPDATE action.
    pub on_update: Option<ReferentialAction>,
}

/// A lowered check constraint definition.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckDef {
    /// Constraint name.
    pub name: String,
    /// Structured condition, rendered through the normal expression path.
    pub condition: Expression,
}

/// A table element definition inside CREATE TABLE or ALTER ... ADD.
#[derive(Debug, Clone, PartialEq)]
pub enum Definition {
    /// Column definition.
    Column(ColumnDef),
    /// UNIQUE / PRIMARY KEY constraint.
    Unique(UniqueDef),
    /// FOREIGN KEY constraint.
    ForeignKey(ForeignKeyDef),
    /// CHECK constraint.
    Check(CheckDef),
}

/// The element of an ALTER TABLE statement; DROP distinguishes columns from
/// constraints by variant.
#[derive(Debug, Clone, PartialEq)]
pub enum AlterElement {
    /// ADD a column or constraint.
    Add(Definition),
    /// DROP COLUMN.
    DropColumn(String),
    /// DROP CONSTRAINT.
    DropConstraint(String),
    /// MODIFY a column (default set/drop in the standard baseline).
    Modify(ColumnDef),
    /// RENAME a column; no standard SQL syntax exists, so dialects implement
    /// this individually.
    Rename {
        /// Current column name.
        from: String,
        /// New column name.
        to: String,
    },
}

/// Alter-table sub-action tags accepted by the lowering API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterAction {
    /// ADD each table element.
    Add,
    /// DROP each table element.
    Drop,
    /// MODIFY each column.
    Modify,
}

/// The statement payload.
#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    /// CREATE SCHEMA with nested element statements.
    CreateSchema {
        /// Schema name.
        name: String,
        /// Statements for each contained element, rendered with the schema
        /// name bound in their context.
        elements: Vec<Statement>,
    },
    /// CREATE TABLE.
    CreateTable {
        /// Table name.
        name: String,
        /// Column and constraint definitions in declaration order.
        elements: Vec<Definition>,
    },
    /// CREATE INDEX.
    CreateIndex {
        /// Index name.
        name: String,
        /// Indexed table.
        table: String,
        /// Ordered columns.
        columns: Vec<String>,
        /// UNIQUE index flag.
        unique: bool,
    },
    /// DROP statement.
    Drop {
        /// Object kind.
        object: ObjectType,
        /// Object name.
        name: String,
        /// Optional behavior keyword.
        behavior: Option<DropBehavior>,
        /// Owning table, for dialects whose DROP INDEX needs `ON <table>`.
        table: Option<String>,
    },
    /// ALTER TABLE with a single action element.
    AlterTable {
        /// Table name.
        table: String,
        /// Action element.
        element: AlterElement,
    },
}

/// A dialect-tagged statement node with its render context.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Target dialect.
    pub dialect: Dialect,
    /// Enclosing schema name, used to schema-qualify identifiers.
    pub schema: Option<String>,
    /// Payload.
    pub kind: StatementKind,
}

impl Statement {
    /// Creates a statement with no schema bound.
    #[must_use]
    pub fn new(dialect: Dialect, kind: StatementKind) -> Self {
        Self {
            dialect,
            schema: None,
            kind,
        }
    }

    /// Rebinds the statement to an enclosing schema name so nested
    /// identifiers render schema-qualified.
    #[must_use]
    pub fn in_schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }
}
