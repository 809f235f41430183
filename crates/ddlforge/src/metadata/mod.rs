//! The metadata-access boundary the analyzer reads from.
//!
//! [`MetadataHandle`] exposes a live database's catalog as flat rows shaped
//! like JDBC `DatabaseMetaData` result sets, so one set of analyzer rules
//! works over every engine. [`MemoryMetadata`] is the in-memory implementation
//! used by analyzer tests; [`sqlite::SqliteMetadata`] is the real one.

pub mod sqlite;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

/// Failure of a metadata query.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The engine cannot answer this query at all. The analyzer recovers
    /// from exactly this kind locally by treating the result as empty.
    #[error("metadata query unsupported: {0}")]
    Unsupported(String),
    /// The engine answered with something the handle could not interpret.
    #[error("metadata query failed: {0}")]
    Query(String),
    /// Driver-level failure, surfaced unchanged.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Result alias for metadata queries.
pub type MetadataResult<T> = std::result::Result<T, MetadataError>;

/// One table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// Containing schema, when the engine has schemas.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
    /// Engine table type; `TABLE` for ordinary tables.
    pub table_type: String,
}

/// One column row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnRow {
    /// Column name.
    pub name: String,
    /// Engine-native type name (`int4`, `VARCHAR`, ...).
    pub type_name: String,
    /// Length for character/binary types, precision for numeric ones.
    pub column_size: Option<i64>,
    /// Scale for exact numeric types.
    pub decimal_digits: Option<i64>,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Engine-reported textual default expression.
    pub default: Option<String>,
    /// Whether the engine auto-increments the column.
    pub auto_increment: bool,
    /// One-based position in the table.
    pub ordinal: i32,
}

/// One primary-key column row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrimaryKeyRow {
    /// Constraint name, when the engine reports one.
    pub name: Option<String>,
    /// Key column.
    pub column: String,
    /// One-based position inside the key.
    pub key_seq: i32,
}

/// One index column row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRow {
    /// Index name; absent on statistics entries.
    pub name: Option<String>,
    /// Whether duplicate values are allowed.
    pub non_unique: bool,
    /// Indexed column; absent on statistics entries.
    pub column: Option<String>,
    /// One-based position inside the index.
    pub ordinal: i32,
    /// Table-statistics entry describing no real index.
    pub statistic: bool,
}

/// One imported (foreign) key column row, with JDBC numeric action codes:
/// 0 cascade, 1 restrict, 2 set null, 3 no action, 4 set default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportedKeyRow {
    /// Constraint name, when the engine reports one.
    pub name: Option<String>,
    /// Local column.
    pub column: String,
    /// Referenced table.
    pub parent_table: String,
    /// Referenced column.
    pub parent_column: String,
    /// One-based position inside the key.
    pub key_seq: i32,
    /// ON UPDATE action code.
    pub update_rule: i16,
    /// ON DELETE action code.
    pub delete_rule: i16,
}

/// Read-only access to a live database's metadata.
///
/// Every query is one-shot; implementations hold no cursor state across
/// calls. A query the engine cannot answer returns
/// [`MetadataError::Unsupported`].
#[allow(async_fn_in_trait)]
pub trait MetadataHandle {
    /// Catalog names the engine exposes.
    async fn catalogs(&self) -> MetadataResult<Vec<String>>;

    /// Schema names the engine exposes.
    async fn schemas(&self) -> MetadataResult<Vec<String>>;

    /// Tables of a schema (or of the default schema).
    async fn tables(&self, schema: Option<&str>) -> MetadataResult<Vec<TableRow>>;

    /// Columns of a table, in ordinal order.
    async fn columns(&self, schema: Option<&str>, table: &str) -> MetadataResult<Vec<ColumnRow>>;

    /// Primary-key columns of a table.
    async fn primary_keys(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<PrimaryKeyRow>>;

    /// Index columns of a table.
    async fn index_info(&self, schema: Option<&str>, table: &str)
        -> MetadataResult<Vec<IndexRow>>;

    /// Foreign-key columns of a table.
    async fn imported_keys(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<ImportedKeyRow>>;
}

/// Canned metadata rows for one table.
#[derive(Debug, Clone, Default)]
pub struct TableFixture {
    /// Column rows.
    pub columns: Vec<ColumnRow>,
    /// Primary-key rows.
    pub primary_keys: Vec<PrimaryKeyRow>,
    /// Index rows.
    pub indexes: Vec<IndexRow>,
    /// Foreign-key rows.
    pub imported_keys: Vec<ImportedKeyRow>,
}

/// In-memory [`MetadataHandle`] serving canned rows; individual queries can
/// be switched off to exercise the analyzer's capability-gap recovery.
#[derive(Debug, Default)]
pub struct MemoryMetadata {
    catalogs: Vec<String>,
    schemas: Vec<String>,
    tables: BTreeMap<String, BTreeMap<String, TableFixture>>,
    unsupported: BTreeSet<&'static str>,
}

impl MemoryMetadata {
    /// Creates an empty handle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a catalog name.
    #[must_use]
    pub fn with_catalog(mut self, name: &str) -> Self {
        self.catalogs.push(name.to_string());
        self
    }

    /// Adds a schema name.
    #[must_use]
    pub fn with_schema(mut self, name: &str) -> Self {
        self.schemas.push(name.to_string());
        self
    }

    /// Adds a table with its canned rows; registers the schema name as well.
    #[must_use]
    pub fn with_table(mut self, schema: Option<&str>, table: &str, fixture: TableFixture) -> Self {
        if let Some(schema) = schema {
            if !self.schemas.iter().any(|s| s == schema) {
                self.schemas.push(schema.to_string());
            }
        }
        self.tables
            .entry(schema.unwrap_or_default().to_string())
            .or_default()
            .insert(table.to_string(), fixture);
        self
    }

    /// Makes the named query (`"schemas"`, `"index_info"`, ...) answer
    /// [`MetadataError::Unsupported`].
    #[must_use]
    pub fn without_support_for(mut self, query: &'static str) -> Self {
        self.unsupported.insert(query);
        self
    }

    fn check(&self, query: &str) -> MetadataResult<()> {
        if self.unsupported.contains(query) {
            Err(MetadataError::Unsupported(format!(
                "'{query}' disabled in fixture"
            )))
        } else {
            Ok(())
        }
    }

    fn fixture(&self, schema: Option<&str>, table: &str) -> Option<&TableFixture> {
        self.tables
            .get(schema.unwrap_or_default())
            .and_then(|tables| tables.get(table))
    }
}

impl MetadataHandle for MemoryMetadata {
    async fn catalogs(&self) -> MetadataResult<Vec<String>> {
        self.check("catalogs")?;
        Ok(self.catalogs.clone())
    }

    async fn schemas(&self) -> MetadataResult<Vec<String>> {
        self.check("schemas")?;
        Ok(self.schemas.clone())
    }

    async fn tables(&self, schema: Option<&str>) -> MetadataResult<Vec<TableRow>> {
        self.check("tables")?;
        let tables = self
            .tables
            .get(schema.unwrap_or_default())
            .map(|tables| {
                tables
                    .keys()
                    .map(|name| TableRow {
                        schema: schema.map(ToString::to_string),
                        name: name.clone(),
                        table_type: "TABLE".to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(tables)
    }

    async fn columns(&self, schema: Option<&str>, table: &str) -> MetadataResult<Vec<ColumnRow>> {
        self.check("columns")?;
        Ok(self
            .fixture(schema, table)
            .map(|f| f.columns.clone())
            .unwrap_or_default())
    }

    async fn primary_keys(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<PrimaryKeyRow>> {
        self.check("primary_keys")?;
        Ok(self
            .fixture(schema, table)
            .map(|f| f.primary_keys.clone())
            .unwrap_or_default())
    }

    async fn index_info(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<IndexRow>> {
        self.check("index_info")?;
        Ok(self
            .fixture(schema, table)
            .map(|f| f.indexes.clone())
            .unwrap_or_default())
    }

    async fn imported_keys(
        &self,
        schema: Option<&str>,
        table: &str,
    ) -> MetadataResult<Vec<ImportedKeyRow>> {
        self.check("imported_keys")?;
        Ok(self
            .fixture(schema, table)
            .map(|f| f.imported_keys.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_metadata_serves_canned_rows() {
        let handle = MemoryMetadata::new().with_table(
            Some("PUBLIC"),
            "users",
            TableFixture {
                columns: vec![ColumnRow {
                    name: "id".into(),
                    type_name: "integer".into(),
                    ordinal: 1,
                    ..ColumnRow::default()
                }],
                ..TableFixture::default()
            },
        );

        assert_eq!(handle.schemas().await.unwrap(), vec!["PUBLIC".to_string()]);
        let tables = handle.tables(Some("PUBLIC")).await.unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].name, "users");
        let columns = handle.columns(Some("PUBLIC"), "users").await.unwrap();
        assert_eq!(columns[0].name, "id");
    }

    #[tokio::test]
    async fn test_disabled_query_reports_unsupported() {
        let handle = MemoryMetadata::new().without_support_for("index_info");
        let err = handle.index_info(None, "users").await.unwrap_err();
        assert!(matches!(err, MetadataError::Unsupported(_)));
        assert!(handle.columns(None, "users").await.is_ok());
    }
}
