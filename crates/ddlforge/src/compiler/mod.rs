//! Lowering from the schema model to the dialect-tagged AST, plus the compile
//! entry points.
//!
//! [`Creatable`], [`Dropable`] and [`Alterable`] turn model values into
//! [`Statement`] lists; [`compile`] renders a statement through the dialect
//! registry. Lowering and rendering are pure: nothing here touches a
//! database, and composite results (a schema with its tables, an emulated
//! cascading drop) come back as ordered statement sequences for the caller
//! to execute in order.

use tracing::debug;

use crate::ast::{
    AlterAction, AlterElement, CheckDef, ColumnDef, DataTypeClause, DefaultDef, Definition,
    DropBehavior, ForeignKeyDef, ObjectType, Statement, StatementKind, UniqueDef,
};
use crate::dialect::Dialect;
use crate::error::{DdlError, Result};
use crate::schema::{
    Column, Constraint, DataType, DefaultClause, Expression, Index, Scalar, Schema, Table,
};

/// Model values that lower to create statements, auxiliary objects included.
pub trait Creatable {
    /// Lowers to the ordered create-statement list.
    fn build_create(&self, dialect: Dialect) -> Result<Vec<Statement>>;
}

/// Model values that lower to drop statements.
pub trait Dropable {
    /// Lowers to the ordered drop-statement list.
    fn build_drop(&self, dialect: Dialect, behavior: Option<DropBehavior>)
        -> Result<Vec<Statement>>;
}

/// Tables lower to alter statements, one per contained element; the table
/// value carries the alteration payload, not the live table state.
pub trait Alterable {
    /// Lowers to one alter statement per element for the given action.
    fn build_alter(&self, dialect: Dialect, action: AlterAction) -> Result<Vec<Statement>>;

    /// Lowers a column rename.
    fn build_rename(&self, dialect: Dialect, from: &str, to: &str) -> Statement;
}

/// Renders one statement through the dialect registry.
pub fn compile(stmt: &Statement) -> Result<String> {
    let sql = stmt.dialect.renderer().statement(stmt)?;
    debug!(dialect = %stmt.dialect, %sql, "compiled statement");
    Ok(sql)
}

/// Renders an ordered statement sequence; the caller executes in order.
pub fn compile_all(stmts: &[Statement]) -> Result<Vec<String>> {
    stmts.iter().map(compile).collect()
}

fn lower_data_type(dt: &DataType) -> DataTypeClause {
    DataTypeClause {
        name: dt.name.clone(),
        args: dt.args.clone(),
        encoding: dt.options.encoding.clone(),
        collate: dt.options.collate.clone(),
        time_zone: dt.options.time_zone,
    }
}

/// The canonical current-moment keyword for a `now` default, picked by the
/// declared type.
fn now_keyword(data_type: Option<&DataType>) -> &'static str {
    match data_type.map(|dt| dt.name.as_str()) {
        Some("date") => "current_date",
        Some("time") => "current_time",
        _ => "current_timestamp",
    }
}

pub(crate) fn lower_column(col: &Column) -> ColumnDef {
    let default = col.default.as_ref().map(|default| match default {
        DefaultClause::Value(Expression::Scalar(Scalar::Keyword(k))) if k == "now" => {
            DefaultDef::Value(Expression::keyword(now_keyword(col.data_type.as_ref())))
        }
        DefaultClause::Value(expr) => DefaultDef::Value(expr.clone()),
        DefaultClause::Drop => DefaultDef::Drop,
    });
    ColumnDef {
        name: col.name.clone(),
        data_type: col.data_type.as_ref().map(lower_data_type),
        default,
        auto_inc: col.auto_inc,
        not_null: col.not_null,
        others: col.others.clone(),
    }
}

pub(crate) fn lower_constraint(constraint: &Constraint) -> Result<Definition> {
    match constraint {
        Constraint::Unique(unique) => Ok(Definition::Unique(UniqueDef {
            name: unique.name.clone(),
            kind: unique.kind,
            columns: unique.columns.clone(),
        })),
        Constraint::ForeignKey(fk) => {
            fk.validate()?;
            Ok(Definition::ForeignKey(ForeignKeyDef {
                name: fk.name.clone(),
                columns: fk.columns.clone(),
                parent_table: fk.parent_table.clone(),
                parent_columns: fk.resolved_parent_columns().to_vec(),
                match_type: fk.match_type,
                on_delete: fk.on_delete,
                on_update: fk.on_update,
            }))
        }
        Constraint::Check(check) => Ok(Definition::Check(CheckDef::from(check))),
        Constraint::Named(name) => Err(DdlError::construction(
            "constraint",
            format!("bare constraint '{name}' carries no definition to create"),
        )),
    }
}

impl Creatable for Index {
    fn build_create(&self, dialect: Dialect) -> Result<Vec<Statement>> {
        Ok(vec![Statement::new(
            dialect,
            StatementKind::CreateIndex {
                name: self.name.clone(),
                table: self.table.clone(),
                columns: self.columns.clone(),
                unique: self.unique,
            },
        )])
    }
}

impl Dropable for Index {
    fn build_drop(
        &self,
        dialect: Dialect,
        behavior: Option<DropBehavior>,
    ) -> Result<Vec<Statement>> {
        Ok(vec![Statement::new(
            dialect,
            StatementKind::Drop {
                object: ObjectType::Index,
                name: self.name.clone(),
                behavior,
                table: Some(self.table.clone()),
            },
        )])
    }
}

impl Creatable for Table {
    fn build_create(&self, dialect: Dialect) -> Result<Vec<Statement>> {
        let mut elements: Vec<Definition> = self
            .columns()
            .map(|col| Definition::Column(lower_column(col)))
            .collect();
        for constraint in self.constraints() {
            elements.push(lower_constraint(constraint)?);
        }
        let mut stmts = vec![Statement::new(
            dialect,
            StatementKind::CreateTable {
                name: self.name.clone(),
                elements,
            },
        )];
        for index in self.indexes() {
            stmts.extend(index.build_create(dialect)?);
        }
        Ok(stmts)
    }
}

impl Dropable for Table {
    fn build_drop(
        &self,
        dialect: Dialect,
        behavior: Option<DropBehavior>,
    ) -> Result<Vec<Statement>> {
        Ok(vec![Statement::new(
            dialect,
            StatementKind::Drop {
                object: ObjectType::Table,
                name: self.name.clone(),
                behavior,
                table: None,
            },
        )])
    }
}

impl Creatable for Schema {
    fn build_create(&self, dialect: Dialect) -> Result<Vec<Statement>> {
        let mut elements = Vec::new();
        for table in self.tables() {
            for stmt in table.build_create(dialect)? {
                elements.push(stmt.in_schema(&self.name));
            }
        }
        for index in self.indexes() {
            for stmt in index.build_create(dialect)? {
                elements.push(stmt.in_schema(&self.name));
            }
        }
        Ok(vec![Statement::new(
            dialect,
            StatementKind::CreateSchema {
                name: self.name.clone(),
                elements,
            },
        )])
    }
}

impl Dropable for Schema {
    /// A cascading drop on a dialect without native support is emulated from
    /// the schema value's own elements: one drop per table, then the plain
    /// schema drop. Callers holding only a name analyze the live schema
    /// first.
    fn build_drop(
        &self,
        dialect: Dialect,
        behavior: Option<DropBehavior>,
    ) -> Result<Vec<Statement>> {
        let emulate = behavior == Some(DropBehavior::Cascade)
            && !dialect.renderer().supports_cascade(ObjectType::Schema);
        if !emulate {
            return Ok(vec![Statement::new(
                dialect,
                StatementKind::Drop {
                    object: ObjectType::Schema,
                    name: self.name.clone(),
                    behavior,
                    table: None,
                },
            )]);
        }

        debug!(%dialect, schema = %self.name, "emulating cascading schema drop");
        let mut stmts = Vec::new();
        for table in self.tables() {
            for stmt in table.build_drop(dialect, None)? {
                stmts.push(stmt.in_schema(&self.name));
            }
        }
        stmts.push(Statement::new(
            dialect,
            StatementKind::Drop {
                object: ObjectType::Schema,
                name: self.name.clone(),
                behavior: None,
                table: None,
            },
        ));
        Ok(stmts)
    }
}

impl Alterable for Table {
    fn build_alter(&self, dialect: Dialect, action: AlterAction) -> Result<Vec<Statement>> {
        let mut elements = Vec::new();
        match action {
            AlterAction::Add => {
                for col in self.columns() {
                    elements.push(AlterElement::Add(Definition::Column(lower_column(col))));
                }
                for constraint in self.constraints() {
                    elements.push(AlterElement::Add(lower_constraint(constraint)?));
                }
            }
            AlterAction::Drop => {
                for col in self.columns() {
                    elements.push(AlterElement::DropColumn(col.name.clone()));
                }
                for constraint in self.constraints() {
                    elements.push(AlterElement::DropConstraint(constraint.name().to_string()));
                }
            }
            AlterAction::Modify => {
                for col in self.columns() {
                    elements.push(AlterElement::Modify(lower_column(col)));
                }
            }
        }
        Ok(elements
            .into_iter()
            .map(|element| {
                Statement::new(
                    dialect,
                    StatementKind::AlterTable {
                        table: self.name.clone(),
                        element,
                    },
                )
            })
            .collect())
    }

    fn build_rename(&self, dialect: Dialect, from: &str, to: &str) -> Statement {
        Statement::new(
            dialect,
            StatementKind::AlterTable {
                table: self.name.clone(),
                element: AlterElement::Rename {
                    from: from.to_string(),
                    to: to.to_string(),
                },
            },
        )
    }
}
