//! Compile -> execute -> analyze round trip against an in-memory SQLite
//! database. The analyzed model must match the built one modulo engine
//! normalization, column by column and constraint by constraint.

use ddlforge::analyzer::analyze_schema;
use ddlforge::compiler::{compile_all, Creatable};
use ddlforge::dialect::Dialect;
use ddlforge::metadata::sqlite::SqliteMetadata;
use ddlforge::schema::{
    ColumnOption, Constraint, Expression, ReferSpec, ReferentialAction, Schema, Table,
    TableBuilder, UniqueKind,
};
use sqlx::SqlitePool;

fn users_table() -> Table {
    TableBuilder::new("users")
        .integer("id", &[ColumnOption::PrimaryKey, ColumnOption::NotNull])
        .varchar(
            "name",
            100,
            &[
                ColumnOption::NotNull,
                ColumnOption::Default(Expression::text("anonymous")),
            ],
        )
        .varchar("email", 255, &[ColumnOption::Unique])
        .integer("age", &[ColumnOption::Default(Expression::integer(0))])
        .build()
        .unwrap()
}

fn posts_table() -> Table {
    TableBuilder::new("posts")
        .integer("id", &[ColumnOption::PrimaryKey, ColumnOption::NotNull])
        .integer(
            "user_id",
            &[
                ColumnOption::NotNull,
                ColumnOption::Refer(
                    ReferSpec::to("users")
                        .columns(&["id"])
                        .on_delete(ReferentialAction::Cascade),
                ),
            ],
        )
        .varchar("title", 200, &[])
        .index(&["title"], false)
        .build()
        .unwrap()
}

async fn apply(pool: &SqlitePool, tables: &[&Table]) {
    for table in tables {
        let statements = table.build_create(Dialect::Sqlite).unwrap();
        for sql in compile_all(&statements).unwrap() {
            sqlx::query(&sql).execute(pool).await.unwrap();
        }
    }
}

fn assert_columns_match(built: &Table, analyzed: &Table) {
    for column in built.columns() {
        let found = analyzed
            .column(&column.name)
            .unwrap_or_else(|| panic!("column '{}' missing from analysis", column.name));
        assert_eq!(found.not_null, column.not_null, "column '{}'", column.name);
        assert_eq!(found.default, column.default, "column '{}'", column.name);

        let built_type = column.data_type.as_ref().unwrap();
        let found_type = found
            .data_type
            .as_ref()
            .unwrap_or_else(|| panic!("column '{}' lost its type", column.name));
        assert_eq!(found_type.name, built_type.name, "column '{}'", column.name);
        assert_eq!(found_type.args, built_type.args, "column '{}'", column.name);
    }
    assert_eq!(analyzed.columns().count(), built.columns().count());
}

fn assert_constraints_match(built: &Table, analyzed: &Table) {
    for constraint in built.constraints() {
        let name = constraint.name();
        let found = analyzed
            .constraint(name)
            .unwrap_or_else(|| panic!("constraint '{name}' missing from analysis"));
        match (constraint, found) {
            (Constraint::Unique(built), Constraint::Unique(found)) => {
                assert_eq!(found.kind, built.kind, "constraint '{name}'");
                assert_eq!(found.columns, built.columns, "constraint '{name}'");
            }
            (Constraint::ForeignKey(built), Constraint::ForeignKey(found)) => {
                assert_eq!(found.parent_table, built.parent_table);
                assert_eq!(found.columns, built.columns);
                assert_eq!(
                    found.parent_columns,
                    built.resolved_parent_columns().to_vec()
                );
                assert_eq!(found.on_delete, built.on_delete);
                assert_eq!(found.on_update, built.on_update);
            }
            (built, found) => panic!("constraint '{name}' changed kind: {built:?} vs {found:?}"),
        }
    }
}

#[tokio::test]
async fn test_sqlite_round_trip() {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    let users = users_table();
    let posts = posts_table();
    apply(&pool, &[&users, &posts]).await;

    let analyzed = analyze_schema(&SqliteMetadata::new(pool), Dialect::Sqlite, None)
        .await
        .unwrap()
        .expect("schema present");

    let analyzed_users = analyzed.table("users").expect("users analyzed");
    assert_columns_match(&users, analyzed_users);
    assert_constraints_match(&users, analyzed_users);

    let analyzed_posts = analyzed.table("posts").expect("posts analyzed");
    assert_columns_match(&posts, analyzed_posts);
    assert_constraints_match(&posts, analyzed_posts);

    let index = analyzed_posts
        .index("posts_index_title")
        .expect("index analyzed");
    assert_eq!(index.columns, vec!["title".to_string()]);
    assert!(!index.unique);
}

#[tokio::test]
async fn test_round_trip_preserves_primary_key_kind() {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    let users = users_table();
    apply(&pool, &[&users]).await;

    let analyzed = analyze_schema(&SqliteMetadata::new(pool), Dialect::Sqlite, None)
        .await
        .unwrap()
        .expect("schema present");
    let table = analyzed.table("users").unwrap();

    match table.constraint("users_primary_key_id") {
        Some(Constraint::Unique(pk)) => {
            assert_eq!(pk.kind, UniqueKind::PrimaryKey);
            assert_eq!(pk.columns, vec!["id".to_string()]);
        }
        other => panic!("expected primary key, got {other:?}"),
    }
    match table.constraint("users_unique_email") {
        Some(Constraint::Unique(unique)) => {
            assert_eq!(unique.kind, UniqueKind::Unique);
            assert_eq!(unique.columns, vec!["email".to_string()]);
        }
        other => panic!("expected unique constraint, got {other:?}"),
    }
}

#[tokio::test]
async fn test_schema_value_survives_serde() {
    // Model snapshots persist through serde for the migration layer.
    let schema = Schema::with_tables("app", vec![users_table(), posts_table()]).unwrap();
    let json = serde_json::to_string(&schema).unwrap();
    let restored: Schema = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, schema);
}
