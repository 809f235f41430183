//! SQLite metadata over an `sqlx` pool.
//!
//! Reads `sqlite_master` and the introspection PRAGMAs and reshapes them into
//! the canonical row types. PRAGMA statements take no bind parameters, so
//! table and index names are interpolated with quote doubling; every name
//! used here comes out of `sqlite_master` in the first place.

use once_cell::sync::Lazy;
use regex::Regex;
use sqlx::{Row, SqlitePool};

use crate::schema::generate_name;

use super::{
    ColumnRow, ImportedKeyRow, IndexRow, MetadataError, MetadataHandle, MetadataResult,
    PrimaryKeyRow, TableRow,
};

/// Declared column type, e.g. `VARCHAR(100)` or `NUMERIC(8, 2)`.
static DECLARED_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*([A-Za-z][A-Za-z ]*?)\s*(?:\(\s*(\d+)\s*(?:,\s*(\d+)\s*)?\))?\s*$").unwrap()
});

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Splits a declared type into the canonical name spelling and its numeric
/// arguments.
fn parse_declared_type(declared: &str) -> (String, Option<i64>, Option<i64>) {
    match DECLARED_TYPE.captures(declared) {
        Some(captures) => {
            let name = captures[1].trim().to_ascii_lowercase().replace(' ', "-");
            let size = captures.get(2).and_then(|m| m.as_str().parse().ok());
            let digits = captures.get(3).and_then(|m| m.as_str().parse().ok());
            (name, size, digits)
        }
        None => (declared.trim().to_ascii_lowercase(), None, None),
    }
}

fn action_code(action: &str) -> i16 {
    match action {
        "CASCADE" => 0,
        "RESTRICT" => 1,
        "SET NULL" => 2,
        "SET DEFAULT" => 4,
        _ => 3,
    }
}

/// [`MetadataHandle`] over a live SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteMetadata {
    pool: SqlitePool,
}

impl SqliteMetadata {
    /// Wraps a pool; the pool is borrowed per query, nothing is cached.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn table_sql(&self, table: &str) -> MetadataResult<Option<String>> {
        let row = sqlx::query("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.and_then(|r| r.try_get::<Option<String>, _>("sql").ok().flatten()))
    }
}

impl MetadataHandle for SqliteMetadata {
    async fn catalogs(&self) -> MetadataResult<Vec<String>> {
        Ok(vec!["main".to_string()])
    }

    async fn schemas(&self) -> MetadataResult<Vec<String>> {
        Err(MetadataError::Unsupported(
            "SQLite has no schemas".to_string(),
        ))
    }

    async fn tables(&self, _schema: Option<&str>) -> MetadataResult<Vec<TableRow>> {
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master \
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(TableRow {
                    schema: None,
                    name: row.try_get("name")?,
                    table_type: "TABLE".to_string(),
                })
            })
            .collect()
    }

    async fn columns(&self, _schema: Option<&str>, table: &str) -> MetadataResult<Vec<ColumnRow>> {
        let auto_inc_table = self
            .table_sql(table)
            .await?
            .is_some_and(|sql| sql.to_ascii_uppercase().contains("AUTOINCREMENT"));

        let rows = sqlx::query(&format!("PRAGMA table_info({})", quoted(table)))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let declared: String = row.try_get("type")?;
                let (type_name, column_size, decimal_digits) = parse_declared_type(&declared);
                let not_null: i64 = row.try_get("notnull")?;
                let pk: i64 = row.try_get("pk")?;
                let cid: i64 = row.try_get("cid")?;
                Ok(ColumnRow {
                    name: row.try_get("name")?,
                    type_name,
                    column_size,
                    decimal_digits,
                    nullable: not_null == 0,
                    default: row.try_get::<Option<String>, _>("dflt_value")?,
                    auto_increment: pk != 0 && auto_inc_table,
                    ordinal: (cid + 1) as i32,
                })
            })
            .collect()
    }

    async fn primary_keys(
        &self,
        _schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<PrimaryKeyRow>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quoted(table)))
            .fetch_all(&self.pool)
            .await?;
        let mut keys = Vec::new();
        for row in rows {
            let pk: i64 = row.try_get("pk")?;
            if pk > 0 {
                keys.push(PrimaryKeyRow {
                    name: None,
                    column: row.try_get("name")?,
                    key_seq: pk as i32,
                });
            }
        }
        keys.sort_by_key(|k| k.key_seq);
        Ok(keys)
    }

    async fn index_info(
        &self,
        _schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<IndexRow>> {
        let indexes = sqlx::query(&format!("PRAGMA index_list({})", quoted(table)))
            .fetch_all(&self.pool)
            .await?;
        let mut out = Vec::new();
        for index in indexes {
            let origin: String = index.try_get("origin")?;
            // The implicit primary-key index is already covered by the
            // primary-key rows.
            if origin == "pk" {
                continue;
            }
            let name: String = index.try_get("name")?;
            let unique: i64 = index.try_get("unique")?;
            let columns = sqlx::query(&format!("PRAGMA index_info({})", quoted(&name)))
                .fetch_all(&self.pool)
                .await?;
            for column in columns {
                let seqno: i64 = column.try_get("seqno")?;
                out.push(IndexRow {
                    name: Some(name.clone()),
                    non_unique: unique == 0,
                    column: column.try_get::<Option<String>, _>("name")?,
                    ordinal: (seqno + 1) as i32,
                    statistic: false,
                });
            }
        }
        Ok(out)
    }

    async fn imported_keys(
        &self,
        _schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<ImportedKeyRow>> {
        let rows = sqlx::query(&format!("PRAGMA foreign_key_list({})", quoted(table)))
            .fetch_all(&self.pool)
            .await?;

        // Rows of one key share an id; name them deterministically so
        // multi-column keys group correctly downstream.
        let mut groups: std::collections::BTreeMap<i64, Vec<ImportedKeyRow>> =
            std::collections::BTreeMap::new();
        for row in rows {
            let id: i64 = row.try_get("id")?;
            let seq: i64 = row.try_get("seq")?;
            let from: String = row.try_get("from")?;
            let to: Option<String> = row.try_get("to")?;
            let on_update: String = row.try_get("on_update")?;
            let on_delete: String = row.try_get("on_delete")?;
            groups.entry(id).or_default().push(ImportedKeyRow {
                name: None,
                parent_column: to.unwrap_or_else(|| from.clone()),
                column: from,
                parent_table: row.try_get("table")?,
                key_seq: (seq + 1) as i32,
                update_rule: action_code(&on_update),
                delete_rule: action_code(&on_delete),
            });
        }

        let mut out = Vec::new();
        for (_, mut group) in groups {
            group.sort_by_key(|row| row.key_seq);
            let columns: Vec<String> = group.iter().map(|row| row.column.clone()).collect();
            let name = generate_name(table, "fkey", &columns);
            for mut row in group {
                row.name = Some(name.clone());
                out.push(row);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn pool_with(ddl: &[&str]) -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        for stmt in ddl {
            sqlx::query(stmt).execute(&pool).await.unwrap();
        }
        pool
    }

    #[test]
    fn test_declared_type_parsing() {
        assert_eq!(parse_declared_type("INTEGER"), ("integer".into(), None, None));
        assert_eq!(
            parse_declared_type("VARCHAR(100)"),
            ("varchar".into(), Some(100), None)
        );
        assert_eq!(
            parse_declared_type("NUMERIC(8, 2)"),
            ("numeric".into(), Some(8), Some(2))
        );
        assert_eq!(
            parse_declared_type("DOUBLE PRECISION"),
            ("double-precision".into(), None, None)
        );
    }

    #[tokio::test]
    async fn test_columns_and_primary_keys() {
        let pool = pool_with(&[
            "CREATE TABLE users (\
             id INTEGER NOT NULL, \
             name VARCHAR(100) DEFAULT 'anonymous', \
             PRIMARY KEY (id))",
        ])
        .await;
        let meta = SqliteMetadata::new(pool);

        let tables = meta.tables(None).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "users");

        let columns = meta.columns(None, "users").await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert!(!columns[0].nullable);
        assert_eq!(columns[1].type_name, "varchar");
        assert_eq!(columns[1].column_size, Some(100));
        assert_eq!(columns[1].default.as_deref(), Some("'anonymous'"));

        let keys = meta.primary_keys(None, "users").await.unwrap();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].column, "id");
    }

    #[tokio::test]
    async fn test_index_and_foreign_key_rows() {
        let pool = pool_with(&[
            "CREATE TABLE users (id INTEGER PRIMARY KEY)",
            "CREATE TABLE posts (\
             id INTEGER PRIMARY KEY, \
             user_id INTEGER, \
             title VARCHAR(200), \
             FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE)",
            "CREATE INDEX posts_index_title ON posts (title)",
        ])
        .await;
        let meta = SqliteMetadata::new(pool);

        let indexes = meta.index_info(None, "posts").await.unwrap();
        let titles: Vec<_> = indexes
            .iter()
            .filter(|r| r.name.as_deref() == Some("posts_index_title"))
            .collect();
        assert_eq!(titles.len(), 1);
        assert!(titles[0].non_unique);
        assert_eq!(titles[0].column.as_deref(), Some("title"));

        let fks = meta.imported_keys(None, "posts").await.unwrap();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].name.as_deref(), Some("posts_fkey_user_id"));
        assert_eq!(fks[0].parent_table, "users");
        assert_eq!(fks[0].parent_column, "id");
        assert_eq!(fks[0].delete_rule, 0);
        assert_eq!(fks[0].update_rule, 3);
    }

    #[tokio::test]
    async fn test_schemas_query_is_unsupported() {
        let pool = pool_with(&[]).await;
        let meta = SqliteMetadata::new(pool);
        assert!(matches!(
            meta.schemas().await.unwrap_err(),
            MetadataError::Unsupported(_)
        ));
        assert_eq!(meta.catalogs().await.unwrap(), vec!["main".to_string()]);
    }
}
