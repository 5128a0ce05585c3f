use async_trait::async_trait;
use rowlens_core::{CellValue, ColumnInfo, DatabaseConfig, TableName};
use rowlens_runtime::{Row, RowFilter, RowRequest, SourceError, TableSource};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::{Arguments, Row as _};

pub mod introspect;
pub mod sql;

fn args_add<T>(args: &mut PgArguments, v: T) -> Result<(), SourceError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v).map_err(|e| SourceError::Query(e.to_string()))
}

fn source_error(e: sqlx::Error) -> SourceError {
    match e {
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Configuration(_) => SourceError::Connection(e.to_string()),
        other => SourceError::Query(other.to_string()),
    }
}

/// [`TableSource`] backed by a Postgres connection pool.
pub struct PgSource {
    pool: sqlx::PgPool,
    schema: String,
}

impl PgSource {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, SourceError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.max(1))
            .connect(&config.connection_string())
            .await
            .map_err(source_error)?;
        tracing::info!(
            host = %config.host,
            database = %config.database,
            schema = %config.schema,
            "Connected to Postgres"
        );
        Ok(Self::from_pool(pool, config.schema.clone()))
    }

    pub fn from_pool(pool: sqlx::PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn filter_args(
        &self,
        columns: &[ColumnInfo],
        filter: &RowFilter,
    ) -> Result<PgArguments, SourceError> {
        let mut args = PgArguments::default();
        if sql::binds_search(columns, filter)
            && let Some(term) = &filter.search
        {
            args_add(&mut args, sql::like_pattern(term))?;
        }
        Ok(args)
    }
}

#[async_trait]
impl TableSource for PgSource {
    async fn list_tables(&self) -> Result<Vec<String>, SourceError> {
        introspect::list_tables(&self.pool, &self.schema)
            .await
            .map_err(source_error)
    }

    async fn table_exists(&self, table: &TableName) -> Result<bool, SourceError> {
        introspect::table_exists(&self.pool, &self.schema, table.as_str())
            .await
            .map_err(source_error)
    }

    async fn columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>, SourceError> {
        introspect::columns(&self.pool, &self.schema, table.as_str())
            .await
            .map_err(source_error)
    }

    async fn count_rows(
        &self,
        table: &TableName,
        columns: &[ColumnInfo],
        filter: &RowFilter,
    ) -> Result<u64, SourceError> {
        let sql = sql::count_sql(&self.schema, table, columns, filter);
        let args = self.filter_args(columns, filter)?;
        tracing::debug!(sql = %sql, "Counting rows");

        let row = sqlx::query_with(&sql, args)
            .fetch_one(&self.pool)
            .await
            .map_err(source_error)?;
        let count: i64 = row.try_get(0).map_err(source_error)?;
        Ok(count.max(0) as u64)
    }

    async fn fetch_rows(
        &self,
        table: &TableName,
        request: &RowRequest,
    ) -> Result<Vec<Row>, SourceError> {
        let sql = sql::select_sql(&self.schema, table, request);
        let mut args = self.filter_args(&request.columns, &request.filter)?;
        args_add(&mut args, i64::from(request.limit))?;
        args_add(&mut args, i64::try_from(request.offset).unwrap_or(i64::MAX))?;
        tracing::debug!(sql = %sql, limit = request.limit, offset = request.offset, "Fetching rows");

        let records = sqlx::query_with(&sql, args)
            .fetch_all(&self.pool)
            .await
            .map_err(source_error)?;

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let mut row = Vec::with_capacity(request.columns.len());
            for (idx, column) in request.columns.iter().enumerate() {
                let value = if column.is_binary() {
                    record
                        .try_get::<Option<Vec<u8>>, _>(idx)
                        .map_err(source_error)?
                        .map(CellValue::Bytes)
                        .unwrap_or(CellValue::Null)
                } else {
                    CellValue::from(record.try_get::<Option<String>, _>(idx).map_err(source_error)?)
                };
                row.push(value);
            }
            rows.push(row);
        }
        Ok(rows)
    }
}
