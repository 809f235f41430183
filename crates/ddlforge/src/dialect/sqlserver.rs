//! Microsoft SQL Server dialect.

use super::{Dialect, SqlDialect};
use crate::analyzer::DialectAnalyzer;
use crate::ast::{ColumnDef, DataTypeClause, ObjectType};
use crate::error::{DdlError, Result};

/// SQL Server: bracket quoting, `IDENTITY`, `sp_rename` for column renames,
/// its own type spellings, and no native cascading schema drop.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServer;

impl SqlDialect for SqlServer {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn quote_chars(&self) -> (char, char) {
        ('[', ']')
    }

    fn auto_inc_clause(&self) -> &'static str {
        "IDENTITY"
    }

    fn type_alias(&self, name: &str) -> String {
        match name {
            "boolean" => "bit".to_string(),
            "double-precision" => "float".to_string(),
            "clob" => "text".to_string(),
            "nclob" => "ntext".to_string(),
            "blob" => "image".to_string(),
            "timestamp" => "datetime".to_string(),
            other => other.to_string(),
        }
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

    fn supports_cascade(&self, object: ObjectType) -> bool {
        object != ObjectType::Schema
    }

    fn modify_action(&self, col: &ColumnDef) -> Result<String> {
        Err(DdlError::unsupported(
            SqlDialect::dialect(self),
            format!(
                "column defaults are bound constraints and cannot be modified in place ('{}')",
                col.name
            ),
        ))
    }

    fn rename_statement(
        &self,
        _schema: Option<&str>,
        table: &str,
        from: &str,
        to: &str,
    ) -> Result<String> {
        Ok(format!("EXEC sp_rename '{table}.{from}', '{to}', 'COLUMN'"))
    }
}

impl DialectAnalyzer for SqlServer {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn canonical_type_name(&self, native: &str) -> String {
        match native.to_ascii_lowercase().as_str() {
            "bit" => "boolean".to_string(),
            "float" => "double-precision".to_string(),
            "text" => "clob".to_string(),
            "ntext" => "nclob".to_string(),
            "image" => "blob".to_string(),
            "datetime" => "timestamp".to_string(),
            "int" => "integer".to_string(),
            other => other.to_string(),
        }
    }
}
