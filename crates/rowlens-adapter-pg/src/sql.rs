//! SQL text for the count and page queries.
//!
//! Only validated identifiers are interpolated, always quoted. The search
//! term is a single bound parameter reused by every column predicate, and the
//! page window is bound after it.

use rowlens_core::table::quote_ident;
use rowlens_core::{ColumnInfo, TableName};
use rowlens_runtime::{RowFilter, RowRequest};

/// Escape `%`, `_` and `\` so the term matches literally inside `LIKE`.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// The bound value for a search term: `%term%` with metacharacters escaped.
pub fn like_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// `"schema"."table"`.
pub fn qualified(schema: &str, table: &TableName) -> String {
    format!("{}.{}", quote_ident(schema), table.quoted())
}

/// `WHERE (...)` clause for `filter`, or an empty string. Uses `$1`.
fn where_clause(columns: &[ColumnInfo], filter: &RowFilter) -> String {
    if filter.search.is_none() || columns.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = columns
        .iter()
        .map(|c| format!("{}::text ILIKE $1 ESCAPE '\\'", quote_ident(&c.name)))
        .collect();
    format!(" WHERE ({})", parts.join(" OR "))
}

/// Whether the query for `filter` binds the search parameter.
pub fn binds_search(columns: &[ColumnInfo], filter: &RowFilter) -> bool {
    filter.search.is_some() && !columns.is_empty()
}

pub fn count_sql(schema: &str, table: &TableName, columns: &[ColumnInfo], filter: &RowFilter) -> String {
    format!(
        "SELECT COUNT(*) FROM {}{}",
        qualified(schema, table),
        where_clause(columns, filter)
    )
}

/// Page query. Binary columns are selected as-is; everything else is cast
/// to text so every value reads back as a string or bytes.
pub fn select_sql(schema: &str, table: &TableName, request: &RowRequest) -> String {
    let select_list: Vec<String> = request
        .columns
        .iter()
        .map(|c| {
            let ident = quote_ident(&c.name);
            if c.is_binary() {
                ident
            } else {
                format!("{ident}::text AS {ident}")
            }
        })
        .collect();

    let mut sql = format!(
        "SELECT {} FROM {}{}",
        select_list.join(", "),
        qualified(schema, table),
        where_clause(&request.columns, &request.filter)
    );

    if let Some(sort) = &request.sort {
        sql.push_str(&format!(" ORDER BY {} {}", quote_ident(&sort.column), sort.order.as_sql()));
    }

    let first = if binds_search(&request.columns, &request.filter) { 2 } else { 1 };
    sql.push_str(&format!(" LIMIT ${} OFFSET ${}", first, first + 1));
    sql
}
