//! `rowlens show`: print one page of a table.

use anyhow::Result;
use std::path::Path;

use rowlens_runtime::TablePage;

#[derive(Debug, Default)]
pub struct ShowArgs {
    pub table: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub search: Option<String>,
    pub orderby: Option<String>,
    pub order: Option<String>,
}

/// Print `page` as a grid followed by its pagination line.
pub fn print_page(page: &TablePage) {
    if page.data.is_empty() {
        println!("No data found");
        return;
    }

    let rows: Vec<Vec<String>> = page
        .data
        .iter()
        .map(|row| {
            page.columns
                .iter()
                .map(|c| row.get(c).map(super::cell_text).unwrap_or_default())
                .collect()
        })
        .collect();
    super::print_grid(&page.columns, &rows);
    println!();
    println!("{}", pagination_line(page));
}

pub fn pagination_line(page: &TablePage) -> String {
    let p = &page.pagination;
    format!(
        "Showing {} to {} of {} entries (page {} of {})",
        p.start_item,
        p.end_item,
        p.total_items,
        p.current_page,
        p.total_pages.max(1)
    )
}

pub async fn run(config_path: &Path, demo: bool, args: ShowArgs) -> Result<()> {
    let config = super::load_config(config_path)?;
    let viewer = super::open_viewer(&config, demo).await?;

    let table = args
        .table
        .unwrap_or_else(|| viewer.default_table().to_string());
    let query = viewer.query(
        args.page,
        args.per_page,
        args.search.as_deref(),
        args.orderby.as_deref(),
        args.order.as_deref(),
    );

    match viewer.table_data(&table, &query).await {
        Ok(page) => {
            print_page(&page);
            Ok(())
        }
        Err(e) => anyhow::bail!("{}: {}", table, e.user_message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowlens_core::RowlensConfig;
    use rowlens_runtime::TableViewer;
    use rowlens_runtime::demo::sample_source;
    use std::sync::Arc;

    #[tokio::test]
    async fn pagination_line_for_a_middle_page() {
        let viewer =
            TableViewer::new(Arc::new(sample_source("wp_")), &RowlensConfig::default()).unwrap();
        let query = viewer.query(Some(2), Some(20), None, None, None);
        let page = viewer.table_data("wp_options", &query).await.unwrap();
        assert_eq!(
            pagination_line(&page),
            "Showing 21 to 40 of 45 entries (page 2 of 3)"
        );
    }

    #[tokio::test]
    async fn unknown_table_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = ShowArgs {
            table: Some("wp_missing".to_string()),
            ..Default::default()
        };
        let err = run(&dir.path().join("rowlens.yaml"), true, args)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("wp_missing"));
    }
}
