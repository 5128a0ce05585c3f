//! Query parameters and pagination math.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard upper bound on rows per page.
pub const MAX_PER_PAGE: u32 = 1000;

/// Rows per page when the request names none.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortOrder {
    /// Parse an untrusted direction; anything but `desc` (any case) is ascending.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    /// Value for the `aria-sort` attribute of a sorted header.
    pub fn aria(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ascending",
            SortOrder::Desc => "descending",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Clamped, normalized query parameters for one page of a table.
///
/// Holds no table name: the name is validated separately against the live
/// schema. `orderby` is still unvalidated here; the viewer service drops it
/// when it is not one of the table's columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    pub page: u64,
    pub per_page: u32,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub orderby: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            search: String::new(),
            orderby: String::new(),
            order: SortOrder::Asc,
        }
    }
}

impl TableQuery {
    /// Build a query from untrusted request values.
    ///
    /// `page` is clamped to at least 1 and `per_page` to `[1, max_per_page]`
    /// (itself capped at [`MAX_PER_PAGE`]).
    pub fn from_raw(
        page: Option<i64>,
        per_page: Option<i64>,
        search: Option<&str>,
        orderby: Option<&str>,
        order: Option<&str>,
        max_per_page: u32,
    ) -> Self {
        let max_per_page = i64::from(max_per_page.clamp(1, MAX_PER_PAGE));
        let page = page.unwrap_or(1).max(1) as u64;
        let per_page = per_page
            .unwrap_or(i64::from(DEFAULT_PER_PAGE))
            .clamp(1, max_per_page) as u32;

        Self {
            page,
            per_page,
            search: search.map(|s| s.trim().to_string()).unwrap_or_default(),
            orderby: orderby.map(|s| s.trim().to_string()).unwrap_or_default(),
            order: order.map(SortOrder::parse).unwrap_or_default(),
        }
    }

    /// Row offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(u64::from(self.per_page))
    }
}

/// Pagination block returned with every page of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u64,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u64,
    pub start_item: u64,
    pub end_item: u64,
}

impl Pagination {
    /// Compute the pagination block for `query` over `total_items` matching rows.
    ///
    /// `start_item`/`end_item` are 1-based and both 0 when the page holds no
    /// rows (empty table, or a page past the end).
    pub fn compute(query: &TableQuery, total_items: u64) -> Self {
        let per_page = u64::from(query.per_page.max(1));
        let total_pages = total_items.div_ceil(per_page);
        let offset = query.offset();

        let (start_item, end_item) = if offset < total_items {
            (offset + 1, (offset + per_page).min(total_items))
        } else {
            (0, 0)
        };

        Self {
            current_page: query.page,
            per_page: query.per_page,
            total_items,
            total_pages,
            start_item,
            end_item,
        }
    }
}
