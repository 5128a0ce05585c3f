//! CLI command implementations.

pub mod browse;
pub mod check;
pub mod serve;
pub mod show;
pub mod snapshot;
pub mod tables;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use rowlens_adapter_pg::PgSource;
use rowlens_core::html::{truncate_chars, unescape_html};
use rowlens_core::{FormattedCell, RowlensConfig};
use rowlens_runtime::demo::sample_source;
use rowlens_runtime::{TableSource, TableViewer};

/// Widest cell printed by `show` and `browse`.
const CELL_WIDTH: usize = 40;

/// Load the configuration, falling back to defaults when the file is absent.
pub fn load_config(path: &Path) -> Result<RowlensConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No configuration file, using defaults");
        return Ok(RowlensConfig::default());
    }
    RowlensConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Build the viewer over the sample tables or the configured database.
pub async fn open_viewer(config: &RowlensConfig, demo: bool) -> Result<Arc<TableViewer>> {
    let source: Arc<dyn TableSource> = if demo {
        tracing::info!(prefix = %config.viewer.table_prefix, "Using the built-in sample tables");
        Arc::new(sample_source(&config.viewer.table_prefix))
    } else {
        Arc::new(
            PgSource::connect(&config.database)
                .await
                .context("Failed to connect to the database")?,
        )
    };
    let viewer = TableViewer::new(source, config).context("Invalid viewer configuration")?;
    Ok(Arc::new(viewer))
}

/// Terminal rendering of a formatted cell: markup removed, entities decoded,
/// cut to [`CELL_WIDTH`] characters.
pub fn cell_text(cell: &FormattedCell) -> String {
    let text = unescape_html(&strip_tags(&cell.display)).replace(['\n', '\r', '\t'], " ");
    if text.chars().count() > CELL_WIDTH {
        format!("{}…", truncate_chars(&text, CELL_WIDTH - 1))
    } else {
        text
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Print `header` and `rows` as left-aligned columns.
pub fn print_grid(header: &[String], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!("{}", line(header).trim_end());
    println!(
        "{}",
        widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("  ")
    );
    for row in rows {
        println!("{}", line(row).trim_end());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rowlens_core::{CellValue, format_cell};
    use tempfile::tempdir;

    #[test]
    fn cell_text_drops_markup() {
        let null = format_cell(&CellValue::Null, None);
        assert_eq!(cell_text(&null), "NULL");

        let text = format_cell(&CellValue::Text("a < b & c".to_string()), None);
        assert_eq!(cell_text(&text), "a < b & c");
    }

    #[test]
    fn cell_text_is_bounded() {
        let long = format_cell(&CellValue::Text("x".repeat(300)), None);
        let out = cell_text(&long);
        assert_eq!(out.chars().count(), CELL_WIDTH);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.viewer.table_prefix, "wp_");
    }

    #[test]
    fn broken_config_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rowlens.yaml");
        std::fs::write(&path, "viewer: [not, a, map]\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to load configuration"));
    }

    #[tokio::test]
    async fn demo_viewer_lists_sample_tables() {
        let viewer = open_viewer(&RowlensConfig::default(), true).await.unwrap();
        let names: Vec<String> = viewer
            .list_tables()
            .await
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect();
        assert!(names.contains(&"wp_options".to_string()));
        assert!(names.contains(&"wp_posts".to_string()));
    }
}
