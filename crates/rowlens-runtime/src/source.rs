//! The table source seam.

use async_trait::async_trait;
use rowlens_core::{CellValue, ColumnInfo, SortOrder, TableName};

use crate::error::SourceError;

/// One row of raw values, in the order of the requested columns.
pub type Row = Vec<CellValue>;

/// Row filter shared by the count and data queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFilter {
    /// Case-insensitive substring matched against every column.
    pub search: Option<String>,
}

impl RowFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn search(term: impl Into<String>) -> Self {
        let term = term.into();
        Self {
            search: (!term.is_empty()).then_some(term),
        }
    }
}

/// Sort column (already validated against the live column list) and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub order: SortOrder,
}

/// One page of rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRequest {
    pub columns: Vec<ColumnInfo>,
    pub filter: RowFilter,
    pub sort: Option<SortSpec>,
    pub limit: u32,
    pub offset: u64,
}

/// Read-only access to the tables of one database schema.
///
/// Implementations receive only [`TableName`]s that passed the allow-list
/// pattern, and column names taken from [`TableSource::columns`].
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Names of all base tables in the schema, in any order.
    async fn list_tables(&self) -> Result<Vec<String>, SourceError>;

    /// Live existence check.
    async fn table_exists(&self, table: &TableName) -> Result<bool, SourceError>;

    /// Columns in ordinal order.
    async fn columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>, SourceError>;

    /// Number of rows matching `filter` across `columns`.
    async fn count_rows(
        &self,
        table: &TableName,
        columns: &[ColumnInfo],
        filter: &RowFilter,
    ) -> Result<u64, SourceError>;

    /// Fetch one page of rows.
    async fn fetch_rows(
        &self,
        table: &TableName,
        request: &RowRequest,
    ) -> Result<Vec<Row>, SourceError>;
}
