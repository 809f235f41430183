//! SQLite dialect.

use super::{Dialect, SqlDialect};
use crate::analyzer::DialectAnalyzer;
use crate::ast::{ColumnDef, DataTypeClause, DropBehavior, ObjectType, Statement};
use crate::error::{DdlError, Result};
use crate::schema::generate_name;

/// SQLite: a single unnamed namespace (no schema qualification, CREATE/DROP
/// SCHEMA have no counterpart), `AUTOINCREMENT`, no encoding or time-zone
/// type options, and no ALTER beyond add/rename.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn qualifies_with_schema(&self) -> bool {
        false
    }

    fn auto_inc_clause(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn check_data_type(&self, dt: &DataTypeClause) -> Result<()> {
        if dt.encoding.is_some() {
            return Err(DdlError::unsupported(
                SqlDialect::dialect(self),
                format!("character set on data type '{}'", dt.name),
            ));
        }
        if dt.time_zone {
            return Err(DdlError::unsupported(
                SqlDialect::dialect(self),
                format!("time-zone option on data type '{}'", dt.name),
            ));
        }
        Ok(())
    }

    // There is no CREATE SCHEMA; the contained elements compile into the
    // single namespace.
    fn create_schema(&self, _name: &str, elements: &[Statement]) -> Result<String> {
        let rendered: Vec<String> = elements
            .iter()
            .map(|e| self.statement(e))
            .collect::<Result<_>>()?;
        Ok(rendered.join(self.schema_element_separator()))
    }

    fn drop(
        &self,
        schema: Option<&str>,
        object: ObjectType,
        name: &str,
        behavior: Option<DropBehavior>,
        table: Option<&str>,
    ) -> Result<String> {
        if object == ObjectType::Schema {
            return Err(DdlError::unsupported(
                SqlDialect::dialect(self),
                "schemas cannot be dropped".to_string(),
            ));
        }
        super::standard_drop(self, schema, object, name, behavior, table)
    }

    fn modify_action(&self, col: &ColumnDef) -> Result<String> {
        Err(DdlError::unsupported(
            SqlDialect::dialect(self),
            format!("columns cannot be modified in place ('{}')", col.name),
        ))
    }

    fn rename_statement(
        &self,
        _schema: Option<&str>,
        table: &str,
        from: &str,
        to: &str,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.identifier(table),
            self.identifier(from),
            self.identifier(to)
        ))
    }
}

impl DialectAnalyzer for Sqlite {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn supports_schemas(&self) -> bool {
        false
    }

    // Implicit unique indexes get engine names; regenerate the deterministic
    // one so a round trip matches the built model.
    fn unique_constraint_name(&self, raw: &str, table: &str, columns: &[String]) -> String {
        if raw.starts_with("sqlite_autoindex") {
            generate_name(table, "unique", columns)
        } else {
            raw.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StatementKind;

    #[test]
    fn test_sqlite_never_schema_qualifies() {
        let d = Dialect::Sqlite.renderer();
        assert_eq!(d.qualified_identifier(Some("main"), "users"), "\"users\"");
    }

    #[test]
    fn test_sqlite_create_schema_renders_elements_only() {
        let d = Dialect::Sqlite.renderer();
        let table = Statement::new(
            Dialect::Sqlite,
            StatementKind::CreateTable {
                name: "foo".into(),
                elements: vec![],
            },
        )
        .in_schema("app");
        let stmt = Statement::new(
            Dialect::Sqlite,
            StatementKind::CreateSchema {
                name: "app".into(),
                elements: vec![table],
            },
        );
        assert_eq!(d.statement(&stmt).unwrap(), "CREATE TABLE \"foo\" ()");
    }

    #[test]
    fn test_sqlite_rejects_schema_drop_and_modify() {
        let d = Dialect::Sqlite.renderer();
        assert!(d
            .drop(None, ObjectType::Schema, "app", None, None)
            .unwrap_err()
            .is_unsupported());

        let col = ColumnDef {
            name: "bar".into(),
            data_type: None,
            default: Some(crate::ast::DefaultDef::Drop),
            auto_inc: false,
            not_null: false,
            others: vec![],
        };
        assert!(d.modify_action(&col).unwrap_err().is_unsupported());
    }

    #[test]
    fn test_sqlite_autoindex_names_are_regenerated() {
        let rules = Dialect::Sqlite.analyzer();
        assert_eq!(
            rules.unique_constraint_name(
                "sqlite_autoindex_foo_1",
                "foo",
                &["bar".to_string()]
            ),
            "foo_unique_bar"
        );
        assert_eq!(
            rules.unique_constraint_name("foo_unique_bar", "foo", &["bar".to_string()]),
            "foo_unique_bar"
        );
    }
}
