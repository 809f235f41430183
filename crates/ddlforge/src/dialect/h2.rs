//! H2 dialect.

use super::{Dialect, SqlDialect};
use crate::analyzer::{defaults, DialectAnalyzer};
use crate::error::Result;
use crate::schema::Expression;

/// H2 stays closest to the baseline: its divergences are the
/// `AUTO_INCREMENT` clause, a nonstandard column-rename syntax, and
/// uppercase schema names on the metadata side.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2;

impl SqlDialect for H2 {
    fn dialect(&self) -> Dialect {
        Dialect::H2
    }

    fn auto_inc_clause(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn rename_statement(
        &self,
        schema: Option<&str>,
        table: &str,
        from: &str,
        to: &str,
    ) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ALTER COLUMN {} RENAME TO {}",
            self.qualified_identifier(schema, table),
            self.identifier(from),
            self.identifier(to)
        ))
    }
}

impl DialectAnalyzer for H2 {
    fn dialect(&self) -> Dialect {
        Dialect::H2
    }

    fn normalize_schema_name(&self, name: &str) -> String {
        name.to_ascii_uppercase()
    }

    // The H2 driver reports function-call defaults upper-cased, which the
    // standard parser would treat as opaque text.
    fn parse_default(&self, text: &str) -> Expression {
        defaults::parse_with_upper_calls(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::AlterElement;

    #[test]
    fn test_h2_column_rename() {
        let d = Dialect::H2.renderer();
        let sql = d
            .alter_table(
                None,
                "users",
                &AlterElement::Rename {
                    from: "name".into(),
                    to: "full_name".into(),
                },
            )
            .unwrap();
        assert_eq!(
            sql,
            "ALTER TABLE \"users\" ALTER COLUMN \"name\" RENAME TO \"full_name\""
        );
    }

    #[test]
    fn test_h2_analyzer_patches_uppercase_calls() {
        let rules = Dialect::H2.analyzer();
        assert_eq!(rules.parse_default("NOW()"), Expression::call("now", vec![]));
        assert_eq!(rules.normalize_schema_name("public"), "PUBLIC");
    }
}
