//! `rowlens tables`: list the allow-listed tables.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use rowlens_dashboard::embed::snippet;
use rowlens_runtime::{TableCount, TableViewer};

#[derive(Debug, Serialize)]
struct TableEntry {
    name: String,
    snippet: String,
    columns: Vec<ColumnEntry>,
    #[serde(flatten)]
    count: TableCount,
}

#[derive(Debug, Serialize)]
struct ColumnEntry {
    name: String,
    data_type: String,
}

async fn collect(viewer: &TableViewer) -> Vec<TableEntry> {
    let counts = viewer.table_counts().await;
    let mut entries = Vec::new();
    for table in viewer.list_tables().await {
        let columns = match viewer.columns(&table).await {
            Ok(columns) => columns
                .into_iter()
                .map(|c| ColumnEntry {
                    name: c.name,
                    data_type: c.data_type,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "Unable to read columns");
                Vec::new()
            }
        };
        let count = counts
            .get(table.as_str())
            .cloned()
            .unwrap_or_else(TableCount::failed);
        entries.push(TableEntry {
            name: table.as_str().to_string(),
            snippet: snippet(table.as_str()),
            columns,
            count,
        });
    }
    entries
}

pub async fn run(config_path: &Path, demo: bool, json: bool) -> Result<()> {
    let config = super::load_config(config_path)?;
    let viewer = super::open_viewer(&config, demo).await?;
    let entries = collect(&viewer).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!(
            "No database tables found with the prefix '{}'.",
            viewer.prefix()
        );
        return Ok(());
    }

    let header = ["Table Name", "Total Rows", "Shortcode"].map(String::from);
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let count = match (&e.count.formatted, &e.count.error) {
                (Some(formatted), _) => formatted.clone(),
                (None, Some(error)) => error.clone(),
                (None, None) => e.count.count.to_string(),
            };
            vec![e.name.clone(), count, e.snippet.clone()]
        })
        .collect();
    super::print_grid(&header, &rows);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowlens_core::RowlensConfig;
    use rowlens_runtime::demo::sample_source;
    use std::sync::Arc;

    #[tokio::test]
    async fn entries_carry_counts_columns_and_snippets() {
        let source = Arc::new(sample_source("wp_").with_failing_table("wp_broken"));
        let viewer = TableViewer::new(source, &RowlensConfig::default()).unwrap();
        let entries = collect(&viewer).await;

        let options = entries.iter().find(|e| e.name == "wp_options").unwrap();
        assert_eq!(options.count.count, 45);
        assert_eq!(options.snippet, "[rowlens_table table='wp_options']");
        assert!(!options.columns.is_empty());

        let broken = entries.iter().find(|e| e.name == "wp_broken").unwrap();
        assert!(broken.count.is_error());
        assert!(broken.columns.is_empty());

        let json = serde_json::to_value(broken).unwrap();
        assert_eq!(json["error"], "Unable to access table");
    }
}
