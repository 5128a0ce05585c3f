//! The table viewer service.
//!
//! One [`TableViewer`] is built at startup and shared by every request. It
//! owns the caches and enforces the rules that keep untrusted input out of
//! SQL: table names pass the prefix pattern and a live existence check, and
//! the sort column must be one of the table's columns.

use rowlens_core::format::CellFormatter;
use rowlens_core::html::format_count;
use rowlens_core::{
    ColumnInfo, FormattedCell, Pagination, RowlensConfig, TableName, TablePattern, TableQuery,
};
use serde::Serialize;
use serde::ser::SerializeMap;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::TtlCache;
use crate::error::ViewerError;
use crate::source::{RowFilter, RowRequest, SortSpec, TableSource};

/// Per-table error shown when a row count cannot be read.
pub const UNABLE_TO_ACCESS_TABLE: &str = "Unable to access table";

/// A row of formatted cells, serialized as an object in column order.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedRow(Vec<(String, FormattedCell)>);

impl FormattedRow {
    pub fn get(&self, column: &str) -> Option<&FormattedCell> {
        self.0.iter().find(|(name, _)| name == column).map(|(_, cell)| cell)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FormattedCell)> {
        self.0.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FormattedRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, cell) in &self.0 {
            map.serialize_entry(name, cell)?;
        }
        map.end()
    }
}

/// One page of formatted rows.
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub data: Vec<FormattedRow>,
    pub columns: Vec<String>,
    pub pagination: Pagination,
}

/// Row count of one table, or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableCount {
    pub fn counted(count: u64) -> Self {
        Self {
            count,
            formatted: Some(format_count(count)),
            error: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            count: 0,
            formatted: None,
            error: Some(UNABLE_TO_ACCESS_TABLE.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct TableViewer {
    source: Arc<dyn TableSource>,
    pattern: TablePattern,
    formatter: CellFormatter,
    default_table: String,
    per_page: u32,
    max_per_page: u32,
    tables: TtlCache<String, Vec<TableName>>,
    columns: TtlCache<TableName, Vec<ColumnInfo>>,
    counts: TtlCache<TableName, u64>,
}

impl TableViewer {
    pub fn new(source: Arc<dyn TableSource>, config: &RowlensConfig) -> Result<Self, ViewerError> {
        let viewer = &config.viewer;
        Ok(Self {
            source,
            pattern: TablePattern::new(&viewer.table_prefix)?,
            formatter: CellFormatter::new(viewer.long_text_threshold),
            default_table: viewer.default_table(),
            per_page: viewer.per_page,
            max_per_page: viewer.max_per_page,
            tables: TtlCache::new(config.cache.tables_ttl()),
            columns: TtlCache::new(config.cache.columns_ttl()),
            counts: TtlCache::new(config.cache.counts_ttl()),
        })
    }

    pub fn pattern(&self) -> &TablePattern {
        &self.pattern
    }

    pub fn prefix(&self) -> &str {
        self.pattern.prefix()
    }

    /// Table used by embeds that name none.
    pub fn default_table(&self) -> &str {
        &self.default_table
    }

    /// Build a query from untrusted request values using the configured page sizes.
    pub fn query(
        &self,
        page: Option<i64>,
        per_page: Option<i64>,
        search: Option<&str>,
        orderby: Option<&str>,
        order: Option<&str>,
    ) -> TableQuery {
        TableQuery::from_raw(
            page,
            per_page.or(Some(i64::from(self.per_page))),
            search,
            orderby,
            order,
            self.max_per_page,
        )
    }

    /// Tables carrying the prefix, sorted by name.
    ///
    /// A failing listing is logged and reported as empty; it is not cached.
    pub async fn list_tables(&self) -> Vec<TableName> {
        let key = self.pattern.prefix().to_string();
        if let Some(tables) = self.tables.get(&key) {
            return tables;
        }

        match self.source.list_tables().await {
            Ok(names) => {
                let mut tables: Vec<TableName> = names
                    .iter()
                    .filter(|name| self.pattern.has_prefix(name))
                    .filter_map(|name| self.pattern.parse(name).ok())
                    .collect();
                tables.sort();
                tables.dedup();
                tracing::debug!(prefix = %key, count = tables.len(), "Refreshed table list");
                self.tables.insert(key, tables.clone());
                tables
            }
            Err(e) => {
                tracing::error!(prefix = %key, error = %e, "Failed to list tables");
                Vec::new()
            }
        }
    }

    /// Validate an untrusted table name against the pattern and the live schema.
    pub async fn resolve_table(&self, raw: &str) -> Result<TableName, ViewerError> {
        if raw.trim().is_empty() {
            return Err(ViewerError::TableRequired);
        }
        let table = self.pattern.parse(raw).map_err(|e| {
            tracing::debug!(table = raw, error = %e, "Rejected table name");
            ViewerError::TableNotAccessible
        })?;
        let exists = self
            .source
            .table_exists(&table)
            .await
            .inspect_err(|e| tracing::error!(table = %table, error = %e, "Table lookup failed"))?;
        if !exists {
            tracing::debug!(table = %table, "Table not found");
            return Err(ViewerError::TableNotAccessible);
        }
        Ok(table)
    }

    /// Column list of `table`, cached.
    ///
    /// A failed or empty lookup surfaces as [`ViewerError::Structure`] and is
    /// not cached.
    pub async fn columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>, ViewerError> {
        if let Some(columns) = self.columns.get(table) {
            return Ok(columns);
        }
        let columns = self.source.columns(table).await.map_err(|e| {
            tracing::error!(table = %table, error = %e, "Failed to read table structure");
            ViewerError::Structure
        })?;
        if columns.is_empty() {
            return Err(ViewerError::Structure);
        }
        self.columns.insert(table.clone(), columns.clone());
        Ok(columns)
    }

    /// One page of formatted rows.
    pub async fn table_data(
        &self,
        raw_table: &str,
        query: &TableQuery,
    ) -> Result<TablePage, ViewerError> {
        let table = self.resolve_table(raw_table).await?;
        let columns = self.columns(&table).await?;

        let sort = (!query.orderby.is_empty())
            .then(|| columns.iter().find(|c| c.name == query.orderby))
            .flatten()
            .map(|c| SortSpec {
                column: c.name.clone(),
                order: query.order,
            });
        if sort.is_none() && !query.orderby.is_empty() {
            tracing::debug!(table = %table, orderby = %query.orderby, "Ignoring unknown sort column");
        }

        let filter = RowFilter::search(query.search.clone());
        let total = self
            .source
            .count_rows(&table, &columns, &filter)
            .await
            .inspect_err(|e| tracing::error!(table = %table, error = %e, "Count query failed"))?;

        let request = RowRequest {
            columns: columns.clone(),
            filter,
            sort,
            limit: query.per_page,
            offset: query.offset(),
        };
        let rows = if query.offset() < total {
            self.source
                .fetch_rows(&table, &request)
                .await
                .inspect_err(|e| tracing::error!(table = %table, error = %e, "Data query failed"))?
        } else {
            Vec::new()
        };

        let data = rows
            .into_iter()
            .map(|row| {
                FormattedRow(
                    columns
                        .iter()
                        .zip(row.iter())
                        .map(|(column, value)| {
                            (
                                column.name.clone(),
                                self.formatter.format(value, Some(&column.name)),
                            )
                        })
                        .collect(),
                )
            })
            .collect();

        tracing::debug!(
            table = %table,
            page = query.page,
            per_page = query.per_page,
            total,
            "Loaded table page"
        );

        Ok(TablePage {
            data,
            columns: columns.into_iter().map(|c| c.name).collect(),
            pagination: Pagination::compute(query, total),
        })
    }

    /// Row count per listed table. Failures degrade to an error entry for
    /// that table only.
    pub async fn table_counts(&self) -> BTreeMap<String, TableCount> {
        let mut counts = BTreeMap::new();
        for table in self.list_tables().await {
            let entry = match self.count_table(&table).await {
                Some(count) => TableCount::counted(count),
                None => TableCount::failed(),
            };
            counts.insert(table.to_string(), entry);
        }
        counts
    }

    async fn count_table(&self, table: &TableName) -> Option<u64> {
        if let Some(count) = self.counts.get(table) {
            return Some(count);
        }
        match self.source.count_rows(table, &[], &RowFilter::all()).await {
            Ok(count) => {
                self.counts.insert(table.clone(), count);
                Some(count)
            }
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Failed to count rows");
                None
            }
        }
    }
}
