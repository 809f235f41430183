//! MySQL dialect.

use super::{standard_foreign_key_def, Dialect, SqlDialect};
use crate::analyzer::DialectAnalyzer;
use crate::ast::{DataTypeClause, ForeignKeyDef, ObjectType};
use crate::error::{DdlError, Result};

/// MySQL: backtick quoting, `AUTO_INCREMENT`, no `MATCH` clause, no
/// `WITH TIME ZONE`, `DROP INDEX ... ON <table>`, and no native cascading
/// schema drop (the lowering layer emulates it).
#[derive(Debug, Clone, Copy, Default)]
pub struct Mysql;

impl SqlDialect for Mysql {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn quote_chars(&self) -> (char, char) {
        ('`', '`')
    }

    fn auto_inc_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn type_alias(&self, name: &str) -> String {
        match name {
            "clob" | "nclob" => "text".to_string(),
            other => other.to_string(),
        }
    }

    fn check_data_type(&self, dt: &DataTypeClause) -> Result<()> {
        if dt.time_zone {
            return Err(DdlError::unsupported(
                SqlDialect::dialect(self),
                format!("time-zone option on data type '{}'", dt.name),
            ));
        }
        Ok(())
    }

    fn foreign_key_def(&self, def: &ForeignKeyDef) -> Result<String> {
        if def.match_type.is_some() {
            return Err(DdlError::unsupported(
                SqlDialect::dialect(self),
                format!("MATCH clause on foreign key '{}'", def.name),
            ));
        }
        standard_foreign_key_def(self, def)
    }

    fn drop_index_requires_table(&self) -> bool {
        true
    }

    fn supports_cascade(&self, object: ObjectType) -> bool {
        object != ObjectType::Schema
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

impl DialectAnalyzer for Mysql {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    // MySQL surfaces databases as catalogs; the schema list is empty.
    fn supports_schemas(&self) -> bool {
        false
    }

    fn canonical_type_name(&self, native: &str) -> String {
        match native.to_ascii_lowercase().as_str() {
            "int" => "integer".to_string(),
            "bit" => "boolean".to_string(),
            "datetime" => "timestamp".to_string(),
            "double" => "double-precision".to_string(),
            "longblob" => "blob".to_string(),
            other => other.to_string(),
        }
    }
}
