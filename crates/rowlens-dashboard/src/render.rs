//! Viewer markup.
//!
//! The viewer container is rendered once per embed; every fetch afterwards
//! returns a [`FragmentResponse`] whose pieces replace the table content and
//! the pagination blocks. Every control carries the query it leads to, taken
//! from [`ViewerState::preview`], so the browser never recomputes paging or
//! sort rules itself.

use rowlens_core::html::escape_html;
use rowlens_core::query::SortOrder;
use rowlens_core::viewer::{ABORT_MESSAGE, NETWORK_MESSAGE, TIMEOUT_MESSAGE};
use rowlens_core::{CellKind, FormattedCell, Pagination, TableQuery, ViewerEvent, ViewerState};
use rowlens_runtime::TablePage;

use crate::api_types::FragmentResponse;
use crate::highlight::highlight;

/// Pages shown on each side of the current one.
const PAGE_WINDOW: u64 = 2;

/// Message of the block that replaces an embed naming an unusable table.
pub const TABLE_ERROR_MESSAGE: &str = "Table does not exist or is not accessible.";

/// Encode a query as the parameters the fragment endpoint reads.
pub fn query_string(query: &TableQuery) -> String {
    format!(
        "page={}&per_page={}&search={}&orderby={}&order={}",
        query.page,
        query.per_page,
        urlencoding::encode(&query.search),
        urlencoding::encode(&query.orderby),
        query.order.as_sql()
    )
}

fn target_attr(state: &ViewerState, event: ViewerEvent) -> String {
    state
        .preview(&event)
        .map(|q| format!(r#" data-target="{}""#, escape_html(&query_string(&q))))
        .unwrap_or_default()
}

/// The viewer shell for one embedded table. Content is loaded by the browser,
/// which reads its transport error messages from the `data-msg-*` attributes.
pub fn container(id: &str, table: &str, nonce: &str, per_page: u32) -> String {
    let id = escape_html(id);
    let table = escape_html(table);
    let nonce = escape_html(nonce);
    let timeout = escape_html(TIMEOUT_MESSAGE);
    let abort = escape_html(ABORT_MESSAGE);
    let network = escape_html(NETWORK_MESSAGE);
    format!(
        r#"<div class="rowlens-table-container" data-testid="rowlens-table-container" data-table="{table}" data-nonce="{nonce}" data-per-page="{per_page}" data-msg-timeout="{timeout}" data-msg-abort="{abort}" data-msg-network="{network}" id="{id}">
    <div class="rowlens-table-controls" data-testid="rowlens-table-controls">
        <div class="rowlens-search-wrapper">
            <label for="{id}_search" data-testid="rowlens-search-label">Search:</label>
            <input type="text" id="{id}_search" class="rowlens-search" placeholder="Search table data..." data-testid="rowlens-search-input" />
        </div>
        <div class="rowlens-info" data-testid="rowlens-table-info">
            <span class="rowlens-table-name" data-testid="rowlens-table-name">{table}</span>
        </div>
    </div>
    <div class="rowlens-table-wrapper" data-testid="rowlens-table-wrapper">
        <div class="rowlens-loading" data-testid="rowlens-loading" style="display: none;">Loading...</div>
        <div class="rowlens-table-content" data-testid="rowlens-table-content"></div>
    </div>
    <div class="rowlens-pagination-wrapper" data-testid="rowlens-pagination-wrapper">
        <div class="rowlens-pagination-info" data-testid="rowlens-pagination-info"></div>
        <div class="rowlens-pagination-controls" data-testid="rowlens-pagination-controls"></div>
    </div>
</div>"#
    )
}

/// Block that replaces an embed naming an unusable table.
pub fn table_error() -> String {
    format!(r#"<div class="rowlens-error" data-testid="rowlens-table-error">{TABLE_ERROR_MESSAGE}</div>"#)
}

/// Inline error shown in place of the table content.
pub fn error(message: &str) -> String {
    format!(
        r#"<div class="rowlens-error" data-testid="rowlens-error">{}</div>"#,
        escape_html(message)
    )
}

pub fn no_data() -> &'static str {
    r#"<div class="rowlens-no-data" data-testid="rowlens-no-data">No data found</div>"#
}

/// Render a loaded page. `state` must hold the page's pagination.
pub fn fragment(seq: u64, page: &TablePage, state: &ViewerState) -> FragmentResponse {
    let content = if page.data.is_empty() {
        no_data().to_string()
    } else {
        table(page, state)
    };
    let pagination = state.pagination().copied().unwrap_or(page.pagination);

    FragmentResponse {
        seq,
        query: query_string(state.query()),
        content,
        pagination_info: pagination_info(&pagination),
        pagination_controls: pagination_controls(state, &pagination),
    }
}

fn table(page: &TablePage, state: &ViewerState) -> String {
    let mut html =
        String::from(r#"<table class="rowlens-data-table" data-testid="rowlens-data-table"><thead><tr>"#);
    for column in &page.columns {
        html.push_str(&header(column, state));
    }
    html.push_str("</tr></thead><tbody>");

    let term = state.highlights().then(|| state.query().search.as_str());
    for (index, row) in page.data.iter().enumerate() {
        html.push_str(&format!(r#"<tr data-testid="rowlens-row-{index}">"#));
        for column in &page.columns {
            let cell = row.get(column);
            let mut content = cell.map(cell_content).unwrap_or_default();
            if let Some(term) = term {
                content = highlight(&content, term);
            }
            html.push_str(&format!(
                r#"<td data-testid="rowlens-cell-{col}-{index}" class="{class}">{content}</td>"#,
                col = escape_html(column),
                class = cell.map(cell_class).unwrap_or(""),
            ));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn header(column: &str, state: &ViewerState) -> String {
    let query = state.query();
    let (sort_class, aria) = if query.orderby == column {
        let class = match query.order {
            SortOrder::Asc => " rowlens-sorted-asc",
            SortOrder::Desc => " rowlens-sorted-desc",
        };
        (class, query.order.aria())
    } else {
        ("", "none")
    };
    let col = escape_html(column);
    format!(
        r#"<th class="rowlens-sortable{sort_class}" data-column="{col}" aria-sort="{aria}"{target} data-testid="rowlens-header-{col}" tabindex="0">{col}</th>"#,
        target = target_attr(state, ViewerEvent::SortBy(column.to_string())),
    )
}

fn cell_class(cell: &FormattedCell) -> &'static str {
    match cell.kind {
        CellKind::LongText => "rowlens-long-cell",
        CellKind::Null | CellKind::Empty => "rowlens-short-cell",
        _ => "",
    }
}

fn cell_content(cell: &FormattedCell) -> String {
    let mut content = cell.display.clone();
    if cell.expandable {
        match (&cell.kind, &cell.full_text, &cell.raw) {
            // full_text is escaped by the formatter.
            (CellKind::LongText, Some(full_text), _) => content.push_str(&format!(
                r#"<button type="button" class="rowlens-expand-btn" data-full-text="{full_text}">Show More</button>"#
            )),
            (CellKind::Serialized | CellKind::Json, _, Some(raw)) => content.push_str(&format!(
                r#"<button type="button" class="rowlens-expand-btn" data-raw="{}">Expand</button>"#,
                escape_html(raw)
            )),
            _ => {}
        }
    }
    format!(
        r#"<div class="rowlens-cell-content" data-type="{}">{content}</div>"#,
        cell.kind.as_str()
    )
}

fn pagination_info(pagination: &Pagination) -> String {
    format!(
        "Showing {} to {} of {} entries",
        pagination.start_item, pagination.end_item, pagination.total_items
    )
}

fn page_button(state: &ViewerState, page: u64, current: u64) -> String {
    let class = if page == current { " rowlens-current" } else { "" };
    format!(
        r#"<button type="button" class="rowlens-pagination-btn{class}" data-page="{page}"{target} data-testid="rowlens-page-{page}">{page}</button>"#,
        target = target_attr(state, ViewerEvent::GotoPage(page)),
    )
}

/// Previous, the window of pages around the current one with the first and
/// last page pinned, then Next.
fn pagination_controls(state: &ViewerState, pagination: &Pagination) -> String {
    let current = pagination.current_page;
    let total = pagination.total_pages;
    let mut html = String::new();

    let prev_disabled = if current <= 1 { " rowlens-disabled" } else { "" };
    html.push_str(&format!(
        r#"<button type="button" class="rowlens-pagination-btn{prev_disabled}" data-page="{}"{} data-testid="rowlens-prev-btn">Previous</button>"#,
        current.saturating_sub(1),
        target_attr(state, ViewerEvent::Arrow(rowlens_core::Direction::Prev)),
    ));

    let start = current.saturating_sub(PAGE_WINDOW).max(1);
    let end = (current + PAGE_WINDOW).min(total);

    if start > 1 {
        html.push_str(&page_button(state, 1, current));
        if start > 2 {
            html.push_str(r#"<span class="rowlens-pagination-ellipsis" data-testid="rowlens-ellipsis-start">...</span>"#);
        }
    }
    for page in start..=end {
        html.push_str(&page_button(state, page, current));
    }
    if end < total {
        if end + 1 < total {
            html.push_str(r#"<span class="rowlens-pagination-ellipsis" data-testid="rowlens-ellipsis-end">...</span>"#);
        }
        html.push_str(&page_button(state, total, current));
    }

    let next_disabled = if current >= total { " rowlens-disabled" } else { "" };
    html.push_str(&format!(
        r#"<button type="button" class="rowlens-pagination-btn{next_disabled}" data-page="{}"{} data-testid="rowlens-next-btn">Next</button>"#,
        current + 1,
        target_attr(state, ViewerEvent::Arrow(rowlens_core::Direction::Next)),
    ));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowlens_core::{CellValue, format_cell};

    fn rendered(query: TableQuery, total: u64) -> ViewerState {
        let mut state = ViewerState::new(query);
        let ticket = state.begin();
        let pagination = Pagination::compute(&ticket.query, total);
        assert!(state.complete(ticket.seq, Ok(pagination)));
        state
    }

    fn at_page(page: u64, total: u64) -> ViewerState {
        rendered(
            TableQuery {
                page,
                per_page: 10,
                ..Default::default()
            },
            total,
        )
    }

    fn controls(state: &ViewerState) -> String {
        pagination_controls(state, state.pagination().unwrap())
    }

    #[test]
    fn query_string_encodes_search() {
        let query = TableQuery {
            search: "a&b c".into(),
            orderby: "option_name".into(),
            order: SortOrder::Desc,
            ..Default::default()
        };
        assert_eq!(
            query_string(&query),
            "page=1&per_page=20&search=a%26b%20c&orderby=option_name&order=DESC"
        );
    }

    #[test]
    fn window_in_the_middle_shows_both_ellipses() {
        let html = controls(&at_page(10, 200));
        for page in [1, 8, 9, 10, 11, 12, 20] {
            assert!(html.contains(&format!(r#"data-testid="rowlens-page-{page}""#)), "page {page}");
        }
        assert!(!html.contains(r#"data-testid="rowlens-page-7""#));
        assert!(html.contains("rowlens-ellipsis-start"));
        assert!(html.contains("rowlens-ellipsis-end"));
        assert!(html.contains(r#"class="rowlens-pagination-btn rowlens-current" data-page="10""#));
    }

    #[test]
    fn window_touching_the_edges_has_no_ellipsis() {
        let html = controls(&at_page(3, 50));
        assert!(!html.contains("rowlens-ellipsis-start"));
        assert!(!html.contains("rowlens-ellipsis-end"));
        for page in 1..=5 {
            assert!(html.contains(&format!(r#"data-testid="rowlens-page-{page}""#)));
        }
    }

    #[test]
    fn bounds_disable_previous_and_next() {
        let first = controls(&at_page(1, 30));
        assert!(first.contains(r#"rowlens-pagination-btn rowlens-disabled" data-page="0" data-testid="rowlens-prev-btn""#));
        assert!(first.contains(r#"data-testid="rowlens-next-btn""#));
        assert!(!first.contains(r#"rowlens-disabled" data-page="2""#));

        let last = controls(&at_page(3, 30));
        assert!(last.contains(r#"rowlens-pagination-btn rowlens-disabled" data-page="4" data-testid="rowlens-next-btn""#));
    }

    #[test]
    fn controls_carry_their_targets() {
        let html = controls(&at_page(2, 30));
        assert!(html.contains(
            r#"data-page="3" data-target="page=3&amp;per_page=10&amp;search=&amp;orderby=&amp;order=ASC""#
        ));
        // The current page leads nowhere.
        assert!(html.contains(r#"rowlens-current" data-page="2" data-testid="rowlens-page-2""#));
    }

    #[test]
    fn info_line() {
        let state = at_page(2, 25);
        assert_eq!(
            pagination_info(state.pagination().unwrap()),
            "Showing 11 to 20 of 25 entries"
        );
        let empty = at_page(1, 0);
        assert_eq!(
            pagination_info(empty.pagination().unwrap()),
            "Showing 0 to 0 of 0 entries"
        );
    }

    #[test]
    fn sorted_header_reports_direction() {
        let state = rendered(
            TableQuery {
                orderby: "id".into(),
                order: SortOrder::Desc,
                ..Default::default()
            },
            5,
        );
        let html = header("id", &state);
        assert!(html.contains(r#"class="rowlens-sortable rowlens-sorted-desc""#));
        assert!(html.contains(r#"aria-sort="descending""#));
        assert!(html.contains("order=ASC"));

        let other = header("name", &state);
        assert!(other.contains(r#"aria-sort="none""#));
        assert!(other.contains("orderby=name&amp;order=ASC"));
    }

    #[test]
    fn cells_get_kind_classes_and_toggles() {
        let long = format_cell(&CellValue::from("x".repeat(150)), None);
        assert_eq!(cell_class(&long), "rowlens-long-cell");
        assert!(cell_content(&long).contains("Show More"));

        let null = format_cell(&CellValue::Null, None);
        assert_eq!(cell_class(&null), "rowlens-short-cell");

        let json = format_cell(&CellValue::from(r#"{"a":"<b>"}"#), None);
        let html = cell_content(&json);
        assert!(html.contains(r#"data-type="json""#));
        assert!(html.contains(r#"data-raw="{&quot;a&quot;:&quot;&lt;b&gt;&quot;}">Expand</button>"#));
    }

    #[test]
    fn no_data_and_errors_escape() {
        assert!(no_data().contains("No data found"));
        assert_eq!(
            error("<bad>"),
            r#"<div class="rowlens-error" data-testid="rowlens-error">&lt;bad&gt;</div>"#
        );
        assert!(table_error().contains(TABLE_ERROR_MESSAGE));
    }

    #[test]
    fn container_escapes_the_table_name() {
        let html = container("rowlens_table_1", "wp_\"x", "n0nce", 20);
        assert!(html.contains(r#"data-table="wp_&quot;x""#));
        assert!(html.contains(r#"data-per-page="20""#));
        assert!(html.contains("Search:"));
    }

    #[test]
    fn container_carries_transport_messages() {
        let html = container("rowlens_table_1", "wp_posts", "n0nce", 20);
        assert!(html.contains(r#"data-msg-timeout="Request timed out. Please try again.""#));
        assert!(html.contains(r#"data-msg-abort="Request was cancelled.""#));
        assert!(html.contains(&format!(r#"data-msg-network="{NETWORK_MESSAGE}""#)));
    }
}
