//! Page templates for dashboard views.

use crate::embed::snippet;
use crate::templates::{card, empty_state, html_escape, layout};
use rowlens_core::TableName;

// =============================================================================
// Admin Page
// =============================================================================

/// Table listing with embed snippets. Row counts are filled in by
/// `/assets/admin.js` from the row count endpoint.
pub fn admin_page(
    tables: &[TableName],
    prefix: &str,
    per_page: u32,
    nonce: &str,
    user: Option<&str>,
) -> String {
    let listing = if tables.is_empty() {
        format!(
            r##"<div class="rowlens-no-tables">{}</div>"##,
            empty_state(
                "database",
                "No tables found",
                &format!(
                    "No database tables found with the prefix '{}'.",
                    html_escape(prefix)
                ),
            )
        )
    } else {
        let rows: String = tables.iter().map(|t| admin_row(t.as_str())).collect();
        format!(
            r##"<div class="rowlens-tables-wrapper overflow-x-auto">
                <table class="rowlens-admin-table min-w-full divide-y divide-gray-200 dark:divide-gray-700" data-testid="rowlens-admin-table">
                    <thead class="bg-gray-50 dark:bg-gray-800">
                        <tr>
                            <th class="rowlens-col-table px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">Table Name</th>
                            <th class="rowlens-col-shortcode px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">Shortcode</th>
                            <th class="rowlens-col-copy px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">Copy</th>
                            <th class="rowlens-col-count px-6 py-3 text-left text-xs font-medium text-gray-500 uppercase tracking-wider">Total Rows</th>
                        </tr>
                    </thead>
                    <tbody class="bg-white dark:bg-gray-900 divide-y divide-gray-200 dark:divide-gray-700">
                        {rows}
                    </tbody>
                </table>
            </div>"##
        )
    };

    let tables_card = format!(
        r##"<div class="rowlens-tables-card bg-white dark:bg-gray-800 rounded-xl shadow-sm border border-gray-200 dark:border-gray-700 overflow-hidden mb-8">
            <div class="rowlens-card-header px-6 py-4 border-b border-gray-200 dark:border-gray-700 flex items-center justify-between">
                <h2 class="text-lg font-semibold text-gray-900 dark:text-white">Available Database Tables</h2>
                <div class="rowlens-loading-indicator text-sm text-gray-500" id="rowlens-row-count-loading" style="display: none;">
                    <i class="fas fa-spinner fa-spin"></i> Loading table information...
                </div>
            </div>
            {listing}
        </div>"##
    );

    let content = format!(
        r##"<div class="mb-8">
            <h1 class="text-2xl font-bold text-gray-900 dark:text-white" data-testid="rowlens-page-title">Database Tables</h1>
        </div>

        <div class="rowlens-admin-container" data-testid="rowlens-admin-container" data-nonce="{nonce}">
            <div class="rowlens-admin-header mb-6">
                <p class="rowlens-description text-gray-500 dark:text-gray-400">
                    Generate shortcodes for displaying database tables with search, pagination, and sorting.
                </p>
            </div>

            {tables_card}

            {usage}

            <div id="rowlens-copy-notification" class="rowlens-notification" style="display: none;" role="status">
                <i class="fas fa-check-circle"></i>
                <span class="rowlens-notification-text"></span>
            </div>
        </div>
        <script src="/assets/admin.js"></script>"##,
        nonce = html_escape(nonce),
        usage = usage_card(per_page),
    );

    layout("Tables", user, &content)
}

fn admin_row(table: &str) -> String {
    let name = html_escape(table);
    let snippet = html_escape(&snippet(table));
    format!(
        r##"<tr class="rowlens-table-row" data-table="{name}" data-testid="rowlens-table-row-{name}">
            <td class="rowlens-table-name px-6 py-4 text-sm"><strong>{name}</strong></td>
            <td class="rowlens-shortcode-cell px-6 py-4 text-sm">
                <code class="rowlens-shortcode-display" data-testid="rowlens-shortcode-{name}">{snippet}</code>
            </td>
            <td class="rowlens-copy-cell px-6 py-4 text-sm">
                <button type="button" class="rowlens-copy-btn px-3 py-1 rounded-lg bg-gray-200 dark:bg-gray-700 hover:bg-gray-300"
                        data-shortcode="{snippet}" data-table="{name}" data-testid="rowlens-copy-btn-{name}">
                    <i class="fas fa-copy"></i> Copy
                </button>
            </td>
            <td class="rowlens-count-cell px-6 py-4 text-sm">
                <span class="rowlens-row-count" data-table="{name}" data-testid="rowlens-count-{name}">
                    <span class="rowlens-loading-dots">...</span>
                </span>
            </td>
        </tr>"##
    )
}

fn usage_card(per_page: u32) -> String {
    let features = format!(
        "The table will display with search, pagination ({per_page} rows per page), and sorting functionality."
    );
    let steps = [
        (
            "Copy Shortcode",
            "Click the \"Copy\" button next to any table to copy its shortcode.",
        ),
        (
            "Paste in Content",
            "Paste the shortcode into any page or content block where the table should appear.",
        ),
        ("Enjoy the Features", features.as_str()),
    ];
    let steps_html: String = steps
        .iter()
        .enumerate()
        .map(|(i, (title, text))| {
            format!(
                r##"<div class="rowlens-step flex gap-4 mb-4">
                    <span class="rowlens-step-number w-8 h-8 rounded-full bg-primary-100 text-primary-600 flex items-center justify-center font-semibold">{n}</span>
                    <div class="rowlens-step-content">
                        <strong class="text-gray-900 dark:text-white">{title}</strong>
                        <p class="text-sm text-gray-500 dark:text-gray-400">{text}</p>
                    </div>
                </div>"##,
                n = i + 1,
                text = html_escape(text),
            )
        })
        .collect();

    format!(
        r##"<div class="rowlens-usage-card">{}</div>"##,
        card(
            "How to Use",
            &format!(r##"<div class="rowlens-usage-steps">{steps_html}</div>"##)
        )
    )
}

// =============================================================================
// Viewer Page
// =============================================================================

/// Standalone page hosting expanded embed content.
pub fn view_page(title: &str, body: &str, user: Option<&str>) -> String {
    let content = format!(
        r##"<div class="mb-6">
            <h1 class="text-2xl font-bold text-gray-900 dark:text-white">{title}</h1>
        </div>
        {body}
        <script src="/assets/viewer.js"></script>"##,
        title = html_escape(title),
    );
    layout(title, user, &content)
}
