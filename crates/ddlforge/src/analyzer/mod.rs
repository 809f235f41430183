//! Reconstruction of the abstract schema model from live database metadata.
//!
//! The inverse of the compiler: given a [`MetadataHandle`] and a dialect tag,
//! [`analyze_schema`] rebuilds a [`Schema`] value isomorphic to one a caller
//! could have written by hand. The standard rules live in free functions and
//! in [`DialectAnalyzer`] default methods; dialects override only their alias
//! tables and driver quirks.

pub mod defaults;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::metadata::{
    ColumnRow, ImportedKeyRow, IndexRow, MetadataError, MetadataHandle, MetadataResult,
    PrimaryKeyRow,
};
use crate::schema::{
    generate_name, Column, Constraint, DataType, DefaultClause, Expression, ForeignKeyConstraint,
    Index, ReferentialAction, Schema, Table, UniqueConstraint, UniqueKind,
};

/// Dialect-specific analysis rules; defaults are the standard rules.
pub trait DialectAnalyzer: Sync {
    /// The dialect these rules belong to.
    fn dialect(&self) -> Dialect;

    /// Whether the engine exposes schemas; engines without schemas are
    /// queried through their catalog list instead.
    fn supports_schemas(&self) -> bool {
        true
    }

    /// The engine-side spelling of a requested schema name.
    fn normalize_schema_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Maps an engine-native type name into the canonical vocabulary.
    fn canonical_type_name(&self, native: &str) -> String {
        native.to_ascii_lowercase()
    }

    /// Extracts the type arguments and the time-zone flag for a column.
    fn type_arguments(&self, canonical: &str, row: &ColumnRow) -> (Vec<i64>, bool) {
        standard_type_arguments(canonical, row)
    }

    /// Maps a JDBC numeric referential-action code; code 3 (no action) and
    /// anything unknown map to "no clause".
    fn referential_action(&self, code: i16) -> Option<ReferentialAction> {
        match code {
            0 => Some(ReferentialAction::Cascade),
            1 => Some(ReferentialAction::Restrict),
            2 => Some(ReferentialAction::SetNull),
            4 => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }

    /// Parses an engine-reported textual default.
    fn parse_default(&self, text: &str) -> Expression {
        defaults::parse(text)
    }

    /// The model name of a unique constraint recovered from index metadata;
    /// engine-generated index names are replaced by the deterministic rule.
    fn unique_constraint_name(&self, raw: &str, _table: &str, _columns: &[String]) -> String {
        raw.to_string()
    }

    /// Final per-column adjustment, for driver quirks the row shape cannot
    /// express.
    fn finish_column(&self, _column: &mut Column, _row: &ColumnRow) {}
}

/// Standard argument-extraction rules per canonical type family.
pub(crate) fn standard_type_arguments(canonical: &str, row: &ColumnRow) -> (Vec<i64>, bool) {
    let native = row.type_name.to_ascii_lowercase();
    let time_zone = matches!(canonical, "time" | "timestamp")
        && (native.contains("with time zone") || native.ends_with("tz"));
    let args = match canonical {
        "char" | "nchar" | "varchar" | "nvarchar" | "binary" | "varbinary" => {
            row.column_size.into_iter().collect()
        }
        "time" | "timestamp" => row.column_size.into_iter().collect(),
        "numeric" | "decimal" => match (row.column_size, row.decimal_digits) {
            (Some(precision), Some(scale)) if scale != 0 => vec![precision, scale],
            (Some(precision), _) => vec![precision],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    (args, time_zone)
}

/// Converts the one locally-recoverable failure kind into an empty row list;
/// every other metadata error propagates.
fn or_empty<T>(result: MetadataResult<Vec<T>>, query: &'static str) -> Result<Vec<T>> {
    match result {
        Ok(rows) => Ok(rows),
        Err(MetadataError::Unsupported(reason)) => {
            warn!(query, %reason, "metadata query unsupported, treating as empty");
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

/// Groups multi-column metadata rows by constraint/index name, keeping the
/// rows of each group ordered by the given sequence key.
fn group_by_name<R>(
    rows: Vec<R>,
    name: impl Fn(&R) -> String,
    seq: impl Fn(&R) -> i32,
) -> BTreeMap<String, Vec<R>> {
    let mut groups: BTreeMap<String, Vec<R>> = BTreeMap::new();
    for row in rows {
        groups.entry(name(&row)).or_default().push(row);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|r| seq(r));
    }
    groups
}

fn analyze_column(rules: &dyn DialectAnalyzer, row: &ColumnRow) -> Result<Column> {
    let canonical = rules.canonical_type_name(&row.type_name);
    let (args, time_zone) = rules.type_arguments(&canonical, row);
    let mut data_type = DataType::new(canonical)?.with_args(args);
    data_type.options.time_zone = time_zone;

    let mut column = Column::new(row.name.clone())?.with_data_type(data_type);
    column.not_null = !row.nullable;
    column.auto_inc = row.auto_increment;
    column.default = row
        .default
        .as_deref()
        .map(|text| DefaultClause::Value(rules.parse_default(text)));
    rules.finish_column(&mut column, row);
    Ok(column)
}

fn analyze_primary_key(table: &mut Table, rows: Vec<PrimaryKeyRow>) -> Result<Option<String>> {
    if rows.is_empty() {
        return Ok(None);
    }
    let mut rows = rows;
    rows.sort_by_key(|r| r.key_seq);
    let columns: Vec<String> = rows.iter().map(|r| r.column.clone()).collect();
    let name = rows
        .iter()
        .find_map(|r| r.name.clone())
        .unwrap_or_else(|| generate_name(&table.name, UniqueKind::PrimaryKey.tag(), &columns));
    table.insert_constraint(Constraint::Unique(UniqueConstraint {
        name: name.clone(),
        kind: UniqueKind::PrimaryKey,
        columns,
    }))?;
    Ok(Some(name))
}

fn analyze_unique_constraints(
    rules: &dyn DialectAnalyzer,
    table: &mut Table,
    rows: &[IndexRow],
    primary_key: Option<&str>,
) -> Result<Vec<String>> {
    let unique_rows: Vec<IndexRow> = rows
        .iter()
        .filter(|r| !r.statistic && !r.non_unique && r.column.is_some() && r.name.is_some())
        .cloned()
        .collect();
    let groups = group_by_name(
        unique_rows,
        |r| r.name.clone().unwrap_or_default(),
        |r| r.ordinal,
    );

    let mut surfaced = Vec::new();
    for (raw_name, group) in groups {
        let columns: Vec<String> = group.iter().filter_map(|r| r.column.clone()).collect();
        let name = rules.unique_constraint_name(&raw_name, &table.name, &columns);
        surfaced.push(raw_name);
        if primary_key == Some(name.as_str()) || table.constraint(&name).is_some() {
            continue;
        }
        table.insert_constraint(Constraint::Unique(UniqueConstraint {
            name,
            kind: UniqueKind::Unique,
            columns,
        }))?;
    }
    Ok(surfaced)
}

fn analyze_foreign_keys(
    rules: &dyn DialectAnalyzer,
    table: &mut Table,
    rows: Vec<ImportedKeyRow>,
) -> Result<()> {
    let groups = group_by_name(rows, |r| r.name.clone().unwrap_or_default(), |r| r.key_seq);
    for (raw_name, group) in groups {
        let columns: Vec<String> = group.iter().map(|r| r.column.clone()).collect();
        let parent_columns: Vec<String> = group.iter().map(|r| r.parent_column.clone()).collect();
        let first = match group.first() {
            Some(first) => first,
            None => continue,
        };
        let name = if raw_name.is_empty() {
            generate_name(&table.name, "fkey", &columns)
        } else {
            raw_name
        };
        table.insert_constraint(Constraint::ForeignKey(ForeignKeyConstraint {
            name,
            columns,
            parent_table: first.parent_table.clone(),
            parent_columns,
            match_type: None,
            on_delete: rules.referential_action(first.delete_rule),
            on_update: rules.referential_action(first.update_rule),
        }))?;
    }
    Ok(())
}

fn analyze_indexes(
    table: &mut Table,
    rows: &[IndexRow],
    surfaced_as_constraints: &[String],
) -> Result<()> {
    let index_rows: Vec<IndexRow> = rows
        .iter()
        .filter(|r| {
            !r.statistic
                && r.non_unique
                && r.column.is_some()
                && r.name
                    .as_deref()
                    .is_some_and(|n| !surfaced_as_constraints.iter().any(|s| s == n))
        })
        .cloned()
        .collect();
    let groups = group_by_name(
        index_rows,
        |r| r.name.clone().unwrap_or_default(),
        |r| r.ordinal,
    );
    for (name, group) in groups {
        let columns: Vec<&str> = group
            .iter()
            .filter_map(|r| r.column.as_deref())
            .collect();
        table.insert_index(Index::new(name, table.name.clone(), &columns)?)?;
    }
    Ok(())
}

/// Rebuilds one table from the handle's metadata.
pub async fn analyze_table<H: MetadataHandle>(
    handle: &H,
    dialect: Dialect,
    schema: Option<&str>,
    name: &str,
) -> Result<Table> {
    let rules = dialect.analyzer();
    debug!(%dialect, table = name, "analyzing table");

    let mut column_rows = or_empty(handle.columns(schema, name).await, "columns")?;
    column_rows.sort_by_key(|r| r.ordinal);
    let pk_rows = or_empty(handle.primary_keys(schema, name).await, "primary_keys")?;
    let index_rows = or_empty(handle.index_info(schema, name).await, "index_info")?;
    let fk_rows = or_empty(handle.imported_keys(schema, name).await, "imported_keys")?;

    let mut table = Table::new(name)?;
    for row in &column_rows {
        table.insert_column(analyze_column(rules, row)?)?;
    }
    let primary_key = analyze_primary_key(&mut table, pk_rows)?;
    let surfaced =
        analyze_unique_constraints(rules, &mut table, &index_rows, primary_key.as_deref())?;
    analyze_foreign_keys(rules, &mut table, fk_rows)?;
    let mut excluded = surfaced;
    if let Some(pk) = primary_key {
        excluded.push(pk);
    }
    analyze_indexes(&mut table, &index_rows, &excluded)?;
    Ok(table)
}

/// Rebuilds a whole schema; `Ok(None)` when the engine lists its schemas and
/// the requested one is absent. `name: None` means the engine's default
/// schema.
pub async fn analyze_schema<H: MetadataHandle>(
    handle: &H,
    dialect: Dialect,
    name: Option<&str>,
) -> Result<Option<Schema>> {
    let rules = dialect.analyzer();
    let requested = name.map(|n| rules.normalize_schema_name(n));

    let known = if rules.supports_schemas() {
        or_empty(handle.schemas().await, "schemas")?
    } else {
        or_empty(handle.catalogs().await, "catalogs")?
    };
    if let Some(requested) = &requested {
        // An empty list means the engine would not say; only a non-empty
        // list that misses the name is authoritative.
        if !known.is_empty() && !known.iter().any(|s| s == requested) {
            debug!(%dialect, schema = %requested, "schema not present");
            return Ok(None);
        }
    }

    let schema_param = requested.as_deref();
    let table_rows = or_empty(handle.tables(schema_param).await, "tables")?;
    let mut tables = Vec::new();
    for row in &table_rows {
        if !row.table_type.is_empty() && row.table_type != "TABLE" {
            continue;
        }
        tables.push(analyze_table(handle, dialect, schema_param, &row.name).await?);
    }

    let model_name = requested.unwrap_or_else(|| "default".to_string());
    debug!(%dialect, schema = %model_name, tables = tables.len(), "analyzed schema");
    Ok(Some(Schema::with_tables(model_name, tables)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{MemoryMetadata, TableFixture};

    fn users_fixture() -> TableFixture {
        TableFixture {
            columns: vec![
                ColumnRow {
                    name: "id".into(),
                    type_name: "INTEGER".into(),
                    ordinal: 1,
                    ..ColumnRow::default()
                },
                ColumnRow {
                    name: "name".into(),
                    type_name: "VARCHAR".into(),
                    column_size: Some(100),
                    nullable: true,
                    ordinal: 2,
                    ..ColumnRow::default()
                },
            ],
            primary_keys: vec![PrimaryKeyRow {
                name: Some("users_primary_key_id".into()),
                column: "id".into(),
                key_seq: 1,
            }],
            ..TableFixture::default()
        }
    }

    #[tokio::test]
    async fn test_analyze_h2_varchar_and_primary_key() {
        let handle = MemoryMetadata::new().with_table(Some("PUBLIC"), "users", users_fixture());

        let schema = analyze_schema(&handle, Dialect::H2, Some("public"))
            .await
            .unwrap()
            .expect("schema present");
        let table = schema.table("users").expect("table present");

        let name = table.column("name").expect("column present");
        let dt = name.data_type.as_ref().expect("data type present");
        assert_eq!(dt.name, "varchar");
        assert_eq!(dt.args, vec![100]);
        assert!(!name.not_null);

        let pk = table
            .constraints()
            .find_map(|c| match c {
                Constraint::Unique(u) if u.kind == UniqueKind::PrimaryKey => Some(u),
                _ => None,
            })
            .expect("primary key reconstructed");
        assert_eq!(pk.columns, vec!["id".to_string()]);
    }

    #[tokio::test]
    async fn test_analyze_keeps_timestamp_precision() {
        let fixture = TableFixture {
            columns: vec![
                ColumnRow {
                    name: "created_at".into(),
                    type_name: "TIMESTAMP".into(),
                    column_size: Some(3),
                    ordinal: 1,
                    ..ColumnRow::default()
                },
                ColumnRow {
                    name: "start".into(),
                    type_name: "TIME".into(),
                    column_size: Some(6),
                    ordinal: 2,
                    ..ColumnRow::default()
                },
            ],
            ..TableFixture::default()
        };
        let handle = MemoryMetadata::new().with_table(None, "events", fixture);

        let table = analyze_table(&handle, Dialect::Sqlite, None, "events")
            .await
            .unwrap();

        let created = table.column("created_at").expect("column present");
        let dt = created.data_type.as_ref().expect("data type present");
        assert_eq!(dt.name, "timestamp");
        assert_eq!(dt.args, vec![3]);

        let start = table.column("start").expect("column present");
        let dt = start.data_type.as_ref().expect("data type present");
        assert_eq!(dt.name, "time");
        assert_eq!(dt.args, vec![6]);
    }

    #[tokio::test]
    async fn test_missing_schema_yields_none() {
        let handle = MemoryMetadata::new().with_schema("PUBLIC");
        let result = analyze_schema(&handle, Dialect::H2, Some("nope"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_unsupported_index_query_degrades_to_no_constraints() {
        let handle = MemoryMetadata::new()
            .with_table(Some("PUBLIC"), "users", users_fixture())
            .without_support_for("index_info");

        let table = analyze_table(&handle, Dialect::H2, Some("PUBLIC"), "users")
            .await
            .unwrap();
        assert_eq!(table.indexes().count(), 0);
        // Columns and the primary key still come through.
        assert!(table.column("id").is_some());
        assert!(table.constraint("users_primary_key_id").is_some());
    }

    #[tokio::test]
    async fn test_foreign_key_action_code_mapping() {
        let fixture = TableFixture {
            columns: vec![ColumnRow {
                name: "user_id".into(),
                type_name: "integer".into(),
                ordinal: 1,
                ..ColumnRow::default()
            }],
            imported_keys: vec![ImportedKeyRow {
                name: Some("posts_fkey_user_id".into()),
                column: "user_id".into(),
                parent_table: "users".into(),
                parent_column: "id".into(),
                key_seq: 1,
                update_rule: 3,
                delete_rule: 0,
            }],
            ..TableFixture::default()
        };
        let handle = MemoryMetadata::new().with_table(None, "posts", fixture);

        let table = analyze_table(&handle, Dialect::Standard, None, "posts")
            .await
            .unwrap();
        let fk = match table.constraint("posts_fkey_user_id") {
            Some(Constraint::ForeignKey(fk)) => fk,
            other => panic!("expected foreign key, got {other:?}"),
        };
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update, None);
        assert_eq!(fk.parent_table, "users");
        assert_eq!(fk.parent_columns, vec!["id".to_string()]);
    }

    #[tokio::test]
    async fn test_multi_column_foreign_key_grouping() {
        let fixture = TableFixture {
            columns: vec![
                ColumnRow {
                    name: "a".into(),
                    type_name: "integer".into(),
                    ordinal: 1,
                    ..ColumnRow::default()
                },
                ColumnRow {
                    name: "b".into(),
                    type_name: "integer".into(),
                    ordinal: 2,
                    ..ColumnRow::default()
                },
            ],
            imported_keys: vec![
                ImportedKeyRow {
                    name: Some("t_fkey_a_b".into()),
                    column: "b".into(),
                    parent_table: "parent".into(),
                    parent_column: "y".into(),
                    key_seq: 2,
                    update_rule: 3,
                    delete_rule: 3,
                },
                ImportedKeyRow {
                    name: Some("t_fkey_a_b".into()),
                    column: "a".into(),
                    parent_table: "parent".into(),
                    parent_column: "x".into(),
                    key_seq: 1,
                    update_rule: 3,
                    delete_rule: 3,
                },
            ],
            ..TableFixture::default()
        };
        let handle = MemoryMetadata::new().with_table(None, "t", fixture);

        let table = analyze_table(&handle, Dialect::Standard, None, "t")
            .await
            .unwrap();
        let fk = match table.constraint("t_fkey_a_b") {
            Some(Constraint::ForeignKey(fk)) => fk,
            other => panic!("expected foreign key, got {other:?}"),
        };
        assert_eq!(fk.columns, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(fk.parent_columns, vec!["x".to_string(), "y".to_string()]);
    }

    #[tokio::test]
    async fn test_non_unique_index_reconstruction() {
        let fixture = TableFixture {
            columns: vec![ColumnRow {
                name: "email".into(),
                type_name: "varchar".into(),
                column_size: Some(255),
                ordinal: 1,
                ..ColumnRow::default()
            }],
            indexes: vec![
                IndexRow {
                    name: Some("users_index_email".into()),
                    non_unique: true,
                    column: Some("email".into()),
                    ordinal: 1,
                    statistic: false,
                },
                IndexRow {
                    name: None,
                    non_unique: true,
                    column: None,
                    ordinal: 0,
                    statistic: true,
                },
            ],
            ..TableFixture::default()
        };
        let handle = MemoryMetadata::new().with_table(None, "users", fixture);

        let table = analyze_table(&handle, Dialect::Standard, None, "users")
            .await
            .unwrap();
        let index = table.index("users_index_email").expect("index present");
        assert_eq!(index.columns, vec!["email".to_string()]);
        assert!(!index.unique);
        assert_eq!(table.constraints().count(), 0);
    }
}
