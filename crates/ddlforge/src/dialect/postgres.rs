//! PostgreSQL dialect.

use super::{standard_column_def, Dialect, SqlDialect};
use crate::analyzer::DialectAnalyzer;
use crate::ast::{ColumnDef, DataTypeClause};
use crate::error::{DdlError, Result};
use crate::metadata::ColumnRow;
use crate::schema::Column;

/// PostgreSQL: `SERIAL`/`BIGSERIAL` substitution for auto-increment integer
/// columns, no per-column `CHARACTER SET`, native cascading drops, and an
/// analyzer alias table for the engine's internal type names.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

fn serial_type(name: &str) -> Option<&'static str> {
    match name {
        "smallint" => Some("smallserial"),
        "integer" => Some("serial"),
        "bigint" => Some("bigserial"),
        _ => None,
    }
}

impl SqlDialect for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn check_data_type(&self, dt: &DataTypeClause) -> Result<()> {
        if dt.encoding.is_some() {
            return Err(DdlError::unsupported(
                SqlDialect::dialect(self),
                format!("per-column character set on data type '{}'", dt.name),
            ));
        }
        Ok(())
    }

    // An auto-increment integer column becomes SERIAL; the serial type
    // replaces both the declared type and the auto-increment clause.
    fn column_def(&self, col: &ColumnDef) -> Result<String> {
        if col.auto_inc {
            if let Some(dt) = &col.data_type {
                if let Some(serial) = serial_type(&dt.name) {
                    let mut col = col.clone();
                    col.auto_inc = false;
                    col.data_type = Some(DataTypeClause {
                        name: serial.to_string(),
                        args: Vec::new(),
                        ..dt.clone()
                    });
                    return standard_column_def(self, &col);
                }
            }
        }
        standard_column_def(self, col)
    }

    fn rename_statement(
        &self,
        schema: Option<&str>,
        table: &str,
        from: &str,
        to: &str,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.qualified_identifier(schema, table),
            self.identifier(from),
            self.identifier(to)
        ))
    }
}

impl DialectAnalyzer for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn canonical_type_name(&self, native: &str) -> String {
        match native.to_ascii_lowercase().as_str() {
            "int2" => "smallint".to_string(),
            "int4" | "serial" => "integer".to_string(),
            "int8" | "bigserial" => "bigint".to_string(),
            "bool" => "boolean".to_string(),
            "bpchar" => "char".to_string(),
            "float4" => "real".to_string(),
            "float8" => "double-precision".to_string(),
            "timestamptz" => "timestamp".to_string(),
            "timetz" => "time".to_string(),
            "bytea" => "blob".to_string(),
            other => other.to_string(),
        }
    }

    // Serial columns come back as int4 plus a nextval() default; that
    // default is the sequence wiring, not a model-level default.
    fn finish_column(&self, column: &mut Column, row: &ColumnRow) {
        if row
            .default
            .as_deref()
            .is_some_and(|d| d.starts_with("nextval("))
        {
            column.auto_inc = true;
            column.default = None;
        }
    }
}
