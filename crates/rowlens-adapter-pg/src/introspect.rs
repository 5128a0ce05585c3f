use chrono::Utc;
use rowlens_core::{ColumnInfo, TablePattern};
use serde_json::json;
use sqlx::{PgPool, Row};

/// Base tables of `schema`, by name.
pub async fn list_tables(pool: &PgPool, schema: &str) -> Result<Vec<String>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        select table_name
        from information_schema.tables
        where table_type = 'BASE TABLE'
          and table_schema = $1
        order by table_name
        "#,
    )
    .bind(schema)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.get::<String, _>("table_name")).collect())
}

pub async fn table_exists(pool: &PgPool, schema: &str, table: &str) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        select exists (
          select 1
          from information_schema.tables
          where table_schema = $1 and table_name = $2
        )
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Columns of `schema.table` in ordinal order.
pub async fn columns(pool: &PgPool, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        select column_name, data_type
        from information_schema.columns
        where table_schema = $1 and table_name = $2
        order by ordinal_position
        "#,
    )
    .bind(schema)
    .bind(table)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ColumnInfo::new(r.get::<String, _>("column_name"), r.get::<String, _>("data_type")))
        .collect())
}

/// Snapshot of every allow-listed table and its columns as stable JSON.
pub async fn schema_snapshot(
    pool: &PgPool,
    schema: &str,
    pattern: &TablePattern,
) -> Result<serde_json::Value, sqlx::Error> {
    let (version,): (String,) = sqlx::query_as("select version()").fetch_one(pool).await?;

    let mut tables_json = Vec::new();
    for name in list_tables(pool, schema).await? {
        if pattern.parse(&name).is_err() {
            continue;
        }
        let columns: Vec<serde_json::Value> = columns(pool, schema, &name)
            .await?
            .into_iter()
            .map(|c| json!({ "name": c.name, "data_type": c.data_type }))
            .collect();
        tables_json.push(json!({
            "name": name,
            "columns": columns,
        }));
    }

    Ok(json!({
        "captured_at": Utc::now().to_rfc3339(),
        "database": {
            "kind": "postgres",
            "version": version,
            "schema": schema,
        },
        "prefix": pattern.prefix(),
        "tables": tables_json,
    }))
}
