//! In-memory [`TableSource`] used by tests and the `--demo` server.

use async_trait::async_trait;
use rowlens_core::{CellValue, ColumnInfo, SortOrder, TableName};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::error::SourceError;
use crate::source::{Row, RowFilter, RowRequest, TableSource};

#[derive(Debug, Clone, Default)]
struct MemoryTable {
    columns: Vec<ColumnInfo>,
    rows: Vec<Row>,
}

/// Source operations that can be made to fail for one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FailingQuery {
    Exists,
    Columns,
    Count,
    Fetch,
}

/// A fixed set of tables held in memory.
///
/// Tables can be marked as failing, for every query or for a single kind of
/// query, which is how the error paths of the viewer are exercised in tests.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: BTreeMap<String, MemoryTable>,
    failing: BTreeMap<String, BTreeSet<FailingQuery>>,
    column_lookups: AtomicUsize,
    list_lookups: AtomicUsize,
    exists_lookups: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table. Rows shorter than `columns` are padded with NULL.
    pub fn with_table(
        mut self,
        name: impl Into<String>,
        columns: Vec<ColumnInfo>,
        rows: Vec<Row>,
    ) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        self.tables.insert(name.into(), MemoryTable { columns, rows });
        self
    }

    /// Make every query touching `name` fail. The table is still listed and
    /// still exists.
    pub fn with_failing_table(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.tables.entry(name.clone()).or_default();
        self.failing.entry(name).or_default().extend([
            FailingQuery::Columns,
            FailingQuery::Count,
            FailingQuery::Fetch,
        ]);
        self
    }

    /// Make only `query` fail for `name`.
    pub fn with_failing_query(mut self, name: impl Into<String>, query: FailingQuery) -> Self {
        self.failing.entry(name.into()).or_default().insert(query);
        self
    }

    /// How many times column metadata was read.
    pub fn column_lookups(&self) -> usize {
        self.column_lookups.load(AtomicOrdering::Relaxed)
    }

    /// How many times the table list was read.
    pub fn list_lookups(&self) -> usize {
        self.list_lookups.load(AtomicOrdering::Relaxed)
    }

    /// How many existence checks were made.
    pub fn exists_lookups(&self) -> usize {
        self.exists_lookups.load(AtomicOrdering::Relaxed)
    }

    fn check(&self, name: &TableName, query: FailingQuery) -> Result<(), SourceError> {
        if self
            .failing
            .get(name.as_str())
            .is_some_and(|queries| queries.contains(&query))
        {
            return Err(SourceError::Query(format!(
                "permission denied for table {}",
                name.as_str()
            )));
        }
        Ok(())
    }

    fn table(&self, name: &TableName, query: FailingQuery) -> Result<&MemoryTable, SourceError> {
        self.check(name, query)?;
        self.tables
            .get(name.as_str())
            .ok_or_else(|| SourceError::Inaccessible(name.to_string()))
    }
}

fn matches(row: &Row, filter: &RowFilter) -> bool {
    let Some(term) = filter.search.as_deref() else {
        return true;
    };
    let term = term.to_lowercase();
    row.iter()
        .filter_map(CellValue::as_text)
        .any(|text| text.to_lowercase().contains(&term))
}

/// NULLs sort last when ascending; numbers compare numerically.
fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_text(), b.as_text()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => match (x.parse::<f64>(), y.parse::<f64>()) {
            (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => x.cmp(y),
        },
    }
}

#[async_trait]
impl TableSource for MemorySource {
    async fn list_tables(&self) -> Result<Vec<String>, SourceError> {
        self.list_lookups.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(self.tables.keys().cloned().collect())
    }

    async fn table_exists(&self, table: &TableName) -> Result<bool, SourceError> {
        self.exists_lookups.fetch_add(1, AtomicOrdering::Relaxed);
        self.check(table, FailingQuery::Exists)?;
        Ok(self.tables.contains_key(table.as_str()))
    }

    async fn columns(&self, table: &TableName) -> Result<Vec<ColumnInfo>, SourceError> {
        self.column_lookups.fetch_add(1, AtomicOrdering::Relaxed);
        Ok(self.table(table, FailingQuery::Columns)?.columns.clone())
    }

    async fn count_rows(
        &self,
        table: &TableName,
        _columns: &[ColumnInfo],
        filter: &RowFilter,
    ) -> Result<u64, SourceError> {
        let table = self.table(table, FailingQuery::Count)?;
        Ok(table.rows.iter().filter(|row| matches(row, filter)).count() as u64)
    }

    async fn fetch_rows(
        &self,
        table: &TableName,
        request: &RowRequest,
    ) -> Result<Vec<Row>, SourceError> {
        let table = self.table(table, FailingQuery::Fetch)?;
        let mut rows: Vec<&Row> = table
            .rows
            .iter()
            .filter(|row| matches(row, &request.filter))
            .collect();

        if let Some(sort) = &request.sort
            && let Some(idx) = table.columns.iter().position(|c| c.name == sort.column)
        {
            rows.sort_by(|a, b| {
                let ord = compare_cells(&a[idx], &b[idx]);
                match sort.order {
                    SortOrder::Asc => ord,
                    SortOrder::Desc => ord.reverse(),
                }
            });
        }

        let indices: Vec<Option<usize>> = request
            .columns
            .iter()
            .map(|wanted| table.columns.iter().position(|c| c.name == wanted.name))
            .collect();

        Ok(rows
            .into_iter()
            .skip(usize::try_from(request.offset).unwrap_or(usize::MAX))
            .take(request.limit as usize)
            .map(|row| {
                indices
                    .iter()
                    .map(|idx| idx.map(|i| row[i].clone()).unwrap_or(CellValue::Null))
                    .collect()
            })
            .collect())
    }
}
