//! Dialect-specific SQL rendering.
//!
//! Rendering is dispatched on (dialect, node kind): the [`SqlDialect`] trait's
//! default method bodies are the SQL-standard baseline, and each concrete
//! dialect overrides only the statements and clauses that diverge from it.
//! The inheritance graph is flat — every concrete dialect falls back to the
//! standard rules — and is declared explicitly by [`Dialect::parent`].

mod h2;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use h2::H2;
pub use mysql::Mysql;
pub use postgres::Postgres;
pub use sqlite::Sqlite;
pub use sqlserver::SqlServer;

use std::fmt;

use crate::ast::{
    AlterElement, ColumnDef, DataTypeClause, DefaultDef, Definition, DropBehavior, ForeignKeyDef,
    ObjectType, Statement, StatementKind, UniqueDef,
};
use crate::error::{DdlError, Result};
use crate::keywords::{as_keyword, as_list, join_parts};
use crate::schema::{CheckConstraint, Expression, Scalar, UniqueKind};

/// A target database dialect, or the shared standard baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// SQL-standard baseline every concrete dialect inherits from.
    Standard,
    /// H2.
    H2,
    /// MySQL.
    Mysql,
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
    /// Microsoft SQL Server.
    SqlServer,
}

static STANDARD: Standard = Standard;
static H2_DIALECT: H2 = H2;
static MYSQL: Mysql = Mysql;
static POSTGRES: Postgres = Postgres;
static SQLITE: Sqlite = Sqlite;
static SQLSERVER: SqlServer = SqlServer;

impl Dialect {
    /// Dialect name used in messages and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::H2 => "h2",
            Self::Mysql => "mysql",
            Self::Postgres => "postgresql",
            Self::Sqlite => "sqlite",
            Self::SqlServer => "sqlserver",
        }
    }

    /// The dialect this one inherits rendering rules from.
    #[must_use]
    pub fn parent(self) -> Option<Dialect> {
        match self {
            Self::Standard => None,
            _ => Some(Self::Standard),
        }
    }

    /// The renderer for this dialect (process-wide, read-only).
    #[must_use]
    pub fn renderer(self) -> &'static dyn SqlDialect {
        match self {
            Self::Standard => &STANDARD,
            Self::H2 => &H2_DIALECT,
            Self::Mysql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::Sqlite => &SQLITE,
            Self::SqlServer => &SQLSERVER,
        }
    }

    /// The analyzer rules for this dialect (process-wide, read-only).
    #[must_use]
    pub fn analyzer(self) -> &'static dyn crate::analyzer::DialectAnalyzer {
        match self {
            Self::Standard => &STANDARD,
            Self::H2 => &H2_DIALECT,
            Self::Mysql => &MYSQL,
            Self::Postgres => &POSTGRES,
            Self::Sqlite => &SQLITE,
            Self::SqlServer => &SQLSERVER,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Wraps an expression rendering in parentheses unless it already is.
fn parenthesized(text: String) -> String {
    if text.starts_with('(') && text.ends_with(')') {
        text
    } else {
        format!("({text})")
    }
}

/// Dialect-specific SQL rendering rules.
///
/// Default method bodies implement the SQL-standard baseline; concrete
/// dialects override selectively. The standard bodies live in free
/// `standard_*` functions so overrides can delegate back to them after
/// adjusting a node.
pub trait SqlDialect: Sync {
    /// The dialect tag these rules belong to.
    fn dialect(&self) -> Dialect;

    // --- identifiers ---------------------------------------------------------

    /// Opening and closing identifier quote characters.
    fn quote_chars(&self) -> (char, char) {
        ('"', '"')
    }

    /// Whether identifiers may be schema-qualified at all.
    fn qualifies_with_schema(&self) -> bool {
        true
    }

    /// Quotes an identifier, doubling any embedded closing quote.
    fn identifier(&self, name: &str) -> String {
        let (open, close) = self.quote_chars();
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Quotes an identifier, prefixing the bound schema when the dialect
    /// supports qualification.
    fn qualified_identifier(&self, schema: Option<&str>, name: &str) -> String {
        match schema {
            Some(s) if self.qualifies_with_schema() => {
                format!("{}.{}", self.identifier(s), self.identifier(name))
            }
            _ => self.identifier(name),
        }
    }

    // --- expressions ---------------------------------------------------------

    /// Renders a scalar literal.
    fn scalar(&self, scalar: &Scalar) -> String {
        match scalar {
            Scalar::Null => "NULL".to_string(),
            Scalar::Bool(true) => "TRUE".to_string(),
            Scalar::Bool(false) => "FALSE".to_string(),
            Scalar::Integer(i) => i.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Scalar::Keyword(k) => as_keyword(k),
        }
    }

    /// Renders an expression tree.
    fn expression(&self, expr: &Expression) -> String {
        standard_expression(self, expr)
    }

    // --- clauses -------------------------------------------------------------

    /// Maps a symbolic type name to the dialect's spelling.
    fn type_alias(&self, name: &str) -> String {
        name.to_string()
    }

    /// Rejects type/option combinations this dialect cannot express.
    fn check_data_type(&self, _dt: &DataTypeClause) -> Result<()> {
        Ok(())
    }

    /// Renders a data-type clause.
    fn data_type(&self, dt: &DataTypeClause) -> Result<String> {
        standard_data_type(self, dt)
    }

    /// The dialect's auto-increment clause text; empty when auto-increment is
    /// expressed through the type instead.
    fn auto_inc_clause(&self) -> &'static str {
        "GENERATED BY DEFAULT AS IDENTITY"
    }

    // --- definitions ---------------------------------------------------------

    /// Renders a column definition.
    fn column_def(&self, col: &ColumnDef) -> Result<String> {
        standard_column_def(self, col)
    }

    /// Renders a unique / primary-key constraint definition.
    fn unique_def(&self, def: &UniqueDef) -> String {
        let kind = match def.kind {
            UniqueKind::Unique => "UNIQUE",
            UniqueKind::PrimaryKey => "PRIMARY KEY",
        };
        let columns: Vec<String> = def.columns.iter().map(|c| self.identifier(c)).collect();
        format!(
            "CONSTRAINT {} {} {}",
            self.identifier(&def.name),
            kind,
            as_list(&columns)
        )
    }

    /// Renders a foreign-key constraint definition.
    fn foreign_key_def(&self, def: &ForeignKeyDef) -> Result<String> {
        standard_foreign_key_def(self, def)
    }

    /// Renders a check constraint definition.
    fn check_def(&self, def: &crate::ast::CheckDef) -> String {
        format!(
            "CONSTRAINT {} CHECK {}",
            self.identifier(&def.name),
            parenthesized(self.expression(&def.condition))
        )
    }

    /// Renders any table element definition.
    fn definition(&self, def: &Definition) -> Result<String> {
        match def {
            Definition::Column(c) => self.column_def(c),
            Definition::Unique(u) => Ok(self.unique_def(u)),
            Definition::ForeignKey(f) => self.foreign_key_def(f),
            Definition::Check(c) => Ok(self.check_def(c)),
        }
    }

    // --- statements ----------------------------------------------------------

    /// Renders a statement node.
    fn statement(&self, stmt: &Statement) -> Result<String> {
        standard_statement(self, stmt)
    }

    /// Separator between a CREATE SCHEMA header and its element statements.
    fn schema_element_separator(&self) -> &'static str {
        "\n"
    }

    /// Renders CREATE SCHEMA with its nested element statements.
    fn create_schema(&self, name: &str, elements: &[Statement]) -> Result<String> {
        standard_create_schema(self, name, elements)
    }

    /// Renders CREATE TABLE.
    fn create_table(
        &self,
        schema: Option<&str>,
        name: &str,
        elements: &[Definition],
    ) -> Result<String> {
        let defs: Vec<String> = elements
            .iter()
            .map(|d| self.definition(d))
            .collect::<Result<_>>()?;
        Ok(format!(
            "CREATE TABLE {} {}",
            self.qualified_identifier(schema, name),
            as_list(&defs)
        ))
    }

    /// Renders CREATE INDEX.
    fn create_index(
        &self,
        schema: Option<&str>,
        name: &str,
        table: &str,
        columns: &[String],
        unique: bool,
    ) -> Result<String> {
        let cols: Vec<String> = columns.iter().map(|c| self.identifier(c)).collect();
        Ok(format!(
            "CREATE {}INDEX {} ON {} {}",
            if unique { "UNIQUE " } else { "" },
            self.identifier(name),
            self.qualified_identifier(schema, table),
            as_list(&cols)
        ))
    }

    /// Whether DROP INDEX must name the owning table (`ON <table>`).
    fn drop_index_requires_table(&self) -> bool {
        false
    }

    /// Whether the dialect natively supports a cascading drop of the object
    /// kind. Dialects answering `false` for schemas get the cascade emulated
    /// by the lowering layer.
    fn supports_cascade(&self, _object: ObjectType) -> bool {
        true
    }

    /// Renders a DROP statement.
    fn drop(
        &self,
        schema: Option<&str>,
        object: ObjectType,
        name: &str,
        behavior: Option<DropBehavior>,
        table: Option<&str>,
    ) -> Result<String> {
        standard_drop(self, schema, object, name, behavior, table)
    }

    /// Renders ALTER TABLE with one action element.
    fn alter_table(&self, schema: Option<&str>, table: &str, element: &AlterElement) -> Result<String> {
        standard_alter_table(self, schema, table, element)
    }

    /// Renders the MODIFY action body; only default set/drop in the baseline.
    fn modify_action(&self, col: &ColumnDef) -> Result<String> {
        match &col.default {
            Some(DefaultDef::Value(expr)) => Ok(format!(
                "ALTER COLUMN {} SET DEFAULT {}",
                self.identifier(&col.name),
                self.expression(expr)
            )),
            Some(DefaultDef::Drop) => Ok(format!(
                "ALTER COLUMN {} DROP DEFAULT",
                self.identifier(&col.name)
            )),
            None => Err(DdlError::unsupported(
                self.dialect(),
                format!(
                    "MODIFY supports only setting or dropping the default of column '{}'",
                    col.name
                ),
            )),
        }
    }

    /// Renders a whole column-rename statement; no standard syntax exists.
    fn rename_statement(
        &self,
        _schema: Option<&str>,
        table: &str,
        from: &str,
        to: &str,
    ) -> Result<String> {
        let _ = (table, to);
        Err(DdlError::unsupported(
            self.dialect(),
            format!("SQL defines no standard syntax to rename column '{from}'"),
        ))
    }
}

// --- standard baseline bodies -----------------------------------------------
//
// Free functions so dialect overrides can adjust a node and fall back to the
// shared rendering.

pub(crate) fn standard_expression<D: SqlDialect + ?Sized>(d: &D, expr: &Expression) -> String {
    match expr {
        Expression::Scalar(s) => d.scalar(s),
        Expression::Identifier(name) => d.identifier(name),
        Expression::Call { name, args } => {
            let rendered: Vec<String> = args.iter().map(|a| d.expression(a)).collect();
            format!("{name}({})", rendered.join(", "))
        }
        Expression::Op { op, args } => {
            let rendered: Vec<String> = args.iter().map(|a| d.expression(a)).collect();
            if rendered.len() == 1 {
                format!("({} {})", as_keyword(op), rendered[0])
            } else {
                format!("({})", rendered.join(&format!(" {} ", as_keyword(op))))
            }
        }
    }
}

pub(crate) fn standard_data_type<D: SqlDialect + ?Sized>(
    d: &D,
    dt: &DataTypeClause,
) -> Result<String> {
    d.check_data_type(dt)?;
    let mut out = as_keyword(&d.type_alias(&dt.name));
    if !dt.args.is_empty() {
        let args: Vec<String> = dt.args.iter().map(ToString::to_string).collect();
        out.push_str(&as_list(&args));
    }
    if let Some(encoding) = &dt.encoding {
        out.push_str(&format!(" CHARACTER SET {encoding}"));
    }
    if let Some(collate) = &dt.collate {
        out.push_str(&format!(" COLLATE {collate}"));
    }
    if dt.time_zone {
        out.push_str(" WITH TIME ZONE");
    }
    Ok(out)
}

pub(crate) fn standard_column_def<D: SqlDialect + ?Sized>(d: &D, col: &ColumnDef) -> Result<String> {
    let mut parts = vec![d.identifier(&col.name)];
    if let Some(dt) = &col.data_type {
        parts.push(d.data_type(dt)?);
    }
    if let Some(DefaultDef::Value(expr)) = &col.default {
        parts.push(format!("DEFAULT {}", d.expression(expr)));
    }
    if col.auto_inc {
        let clause = d.auto_inc_clause();
        if !clause.is_empty() {
            parts.push(clause.to_string());
        }
    }
    if col.not_null {
        parts.push("NOT NULL".to_string());
    }
    parts.extend(col.others.iter().cloned());
    Ok(join_parts(&parts))
}

pub(crate) fn standard_foreign_key_def<D: SqlDialect + ?Sized>(
    d: &D,
    def: &ForeignKeyDef,
) -> Result<String> {
    let columns: Vec<String> = def.columns.iter().map(|c| d.identifier(c)).collect();
    let parent_columns: Vec<String> = def.parent_columns.iter().map(|c| d.identifier(c)).collect();
    let mut out = format!(
        "CONSTRAINT {} FOREIGN KEY {} REFERENCES {} {}",
        d.identifier(&def.name),
        as_list(&columns),
        d.identifier(&def.parent_table),
        as_list(&parent_columns)
    );
    if let Some(match_type) = def.match_type {
        out.push_str(&format!(" MATCH {}", match_type.as_sql()));
    }
    if let Some(action) = def.on_delete {
        out.push_str(&format!(" ON DELETE {}", action.as_sql()));
    }
    if let Some(action) = def.on_update {
        out.push_str(&format!(" ON UPDATE {}", action.as_sql()));
    }
    Ok(out)
}

pub(crate) fn standard_statement<D: SqlDialect + ?Sized>(d: &D, stmt: &Statement) -> Result<String> {
    match &stmt.kind {
        StatementKind::CreateSchema { name, elements } => d.create_schema(name, elements),
        StatementKind::CreateTable { name, elements } => {
            d.create_table(stmt.schema.as_deref(), name, elements)
        }
        StatementKind::CreateIndex {
            name,
            table,
            columns,
            unique,
        } => d.create_index(stmt.schema.as_deref(), name, table, columns, *unique),
        StatementKind::Drop {
            object,
            name,
            behavior,
            table,
        } => d.drop(stmt.schema.as_deref(), *object, name, *behavior, table.as_deref()),
        StatementKind::AlterTable { table, element } => {
            d.alter_table(stmt.schema.as_deref(), table, element)
        }
    }
}

pub(crate) fn standard_create_schema<D: SqlDialect + ?Sized>(
    d: &D,
    name: &str,
    elements: &[Statement],
) -> Result<String> {
    let mut out = format!("CREATE SCHEMA {}", d.identifier(name));
    let rendered: Vec<String> = elements
        .iter()
        .map(|e| d.statement(e))
        .collect::<Result<_>>()?;
    if !rendered.is_empty() {
        out.push_str(d.schema_element_separator());
        out.push_str(&rendered.join(d.schema_element_separator()));
    }
    Ok(out)
}

pub(crate) fn standard_drop<D: SqlDialect + ?Sized>(
    d: &D,
    schema: Option<&str>,
    object: ObjectType,
    name: &str,
    behavior: Option<DropBehavior>,
    table: Option<&str>,
) -> Result<String> {
    let target = match object {
        ObjectType::Schema => d.identifier(name),
        ObjectType::Table | ObjectType::Index => d.qualified_identifier(schema, name),
    };
    let mut out = format!("DROP {} {}", object.keyword(), target);
    if object == ObjectType::Index && d.drop_index_requires_table() {
        if let Some(owner) = table {
            out.push_str(&format!(" ON {}", d.qualified_identifier(schema, owner)));
        }
    }
    if let Some(behavior) = behavior {
        if behavior == DropBehavior::Cascade && !d.supports_cascade(object) {
            return Err(DdlError::unsupported(
                d.dialect(),
                format!("no native cascading drop for {}", object.keyword()),
            ));
        }
        out.push_str(&format!(" {}", behavior.keyword()));
    }
    Ok(out)
}

pub(crate) fn standard_alter_table<D: SqlDialect + ?Sized>(
    d: &D,
    schema: Option<&str>,
    table: &str,
    element: &AlterElement,
) -> Result<String> {
    let prefix = format!("ALTER TABLE {}", d.qualified_identifier(schema, table));
    match element {
        AlterElement::Add(def) => Ok(format!("{prefix} ADD {}", d.definition(def)?)),
        AlterElement::DropColumn(name) => {
            Ok(format!("{prefix} DROP COLUMN {}", d.identifier(name)))
        }
        AlterElement::DropConstraint(name) => {
            Ok(format!("{prefix} DROP CONSTRAINT {}", d.identifier(name)))
        }
        AlterElement::Modify(col) => Ok(format!("{prefix} {}", d.modify_action(col)?)),
        AlterElement::Rename { from, to } => d.rename_statement(schema, table, from, to),
    }
}

/// The shared SQL-standard baseline; every trait default as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl SqlDialect for Standard {
    fn dialect(&self) -> Dialect {
        Dialect::Standard
    }
}

impl crate::analyzer::DialectAnalyzer for Standard {
    fn dialect(&self) -> Dialect {
        Dialect::Standard
    }
}

/// Convenience for building a check definition from the model constraint.
impl From<&CheckConstraint> for crate::ast::CheckDef {
    fn from(check: &CheckConstraint) -> Self {
        Self {
            name: check.name.clone(),
            condition: check.condition.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_concrete_dialect_inherits_from_standard() {
        for dialect in [
            Dialect::H2,
            Dialect::Mysql,
            Dialect::Postgres,
            Dialect::Sqlite,
            Dialect::SqlServer,
        ] {
            assert_eq!(dialect.parent(), Some(Dialect::Standard));
        }
        assert_eq!(Dialect::Standard.parent(), None);
    }

    #[test]
    fn test_standard_identifier_quoting() {
        let d = Dialect::Standard.renderer();
        assert_eq!(d.identifier("foo"), "\"foo\"");
        assert_eq!(d.identifier("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(
            d.qualified_identifier(Some("public"), "users"),
            "\"public\".\"users\""
        );
    }

    #[test]
    fn test_keyword_scalar_rendering() {
        let d = Dialect::Standard.renderer();
        assert_eq!(
            d.scalar(&Scalar::Keyword("current-timestamp".into())),
            "CURRENT TIMESTAMP"
        );
        assert_eq!(
            d.scalar(&Scalar::Keyword("current_timestamp".into())),
            "CURRENT_TIMESTAMP"
        );
        assert_eq!(d.scalar(&Scalar::Text("it's".into())), "'it''s'");
    }

    #[test]
    fn test_expression_rendering() {
        let d = Dialect::Standard.renderer();
        let expr = Expression::op(
            "and",
            vec![
                Expression::op(
                    ">=",
                    vec![Expression::identifier("age"), Expression::integer(0)],
                ),
                Expression::op("not", vec![Expression::identifier("banned")]),
            ],
        );
        assert_eq!(
            d.expression(&expr),
            "((\"age\" >= 0) AND (NOT \"banned\"))"
        );
    }

    #[test]
    fn test_unique_definition_rendering() {
        let d = Dialect::Standard.renderer();
        let def = UniqueDef {
            name: "foo_a_b_c".into(),
            kind: UniqueKind::Unique,
            columns: vec!["a".into(), "b".into(), "c".into()],
        };
        assert_eq!(
            d.unique_def(&def),
            "CONSTRAINT \"foo_a_b_c\" UNIQUE (\"a\", \"b\", \"c\")"
        );

        let def = UniqueDef {
            kind: UniqueKind::PrimaryKey,
            ..def
        };
        assert_eq!(
            d.unique_def(&def),
            "CONSTRAINT \"foo_a_b_c\" PRIMARY KEY (\"a\", \"b\", \"c\")"
        );
    }

    #[test]
    fn test_typeless_column_renders_bare_identifier() {
        let d = Dialect::Standard.renderer();
        let col = ColumnDef {
            name: "foo".into(),
            data_type: None,
            default: None,
            auto_inc: false,
            not_null: false,
            others: vec![],
        };
        assert_eq!(d.column_def(&col).unwrap(), "\"foo\"");
    }

    #[test]
    fn test_data_type_clause_rendering() {
        let d = Dialect::Standard.renderer();
        let dt = DataTypeClause {
            name: "varchar".into(),
            args: vec![100],
            encoding: None,
            collate: Some("utf8_bin".into()),
            time_zone: false,
        };
        assert_eq!(d.data_type(&dt).unwrap(), "VARCHAR(100) COLLATE utf8_bin");

        let dt = DataTypeClause {
            name: "timestamp".into(),
            args: vec![],
            encoding: None,
            collate: None,
            time_zone: true,
        };
        assert_eq!(d.data_type(&dt).unwrap(), "TIMESTAMP WITH TIME ZONE");
    }

    #[test]
    fn test_drop_statement_rendering() {
        let d = Dialect::Standard.renderer();
        assert_eq!(
            d.drop(None, ObjectType::Schema, "foo", None, None).unwrap(),
            "DROP SCHEMA \"foo\""
        );
        assert_eq!(
            d.drop(None, ObjectType::Schema, "foo", Some(DropBehavior::Cascade), None)
                .unwrap(),
            "DROP SCHEMA \"foo\" CASCADE"
        );
    }

    #[test]
    fn test_standard_rename_is_unsupported() {
        let d = Dialect::Standard.renderer();
        let err = d
            .alter_table(
                None,
                "users",
                &AlterElement::Rename {
                    from: "name".into(),
                    to: "full_name".into(),
                },
            )
            .unwrap_err();
        assert!(err.is_unsupported());
    }
}
