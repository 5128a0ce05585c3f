//! `rowlens snapshot`: dump the allow-listed tables and their columns.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use rowlens_adapter_pg::{PgSource, introspect};
use rowlens_core::TablePattern;

pub async fn run(config_path: &Path, out: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path)?;
    let pattern =
        TablePattern::new(&config.viewer.table_prefix).context("Invalid viewer.table_prefix")?;
    let source = PgSource::connect(&config.database)
        .await
        .context("Failed to connect to the database")?;

    let snapshot = introspect::schema_snapshot(source.pool(), source.schema(), &pattern)
        .await
        .context("Failed to read the schema")?;
    let text = serde_json::to_string_pretty(&snapshot)?;

    match out {
        Some(path) => {
            fs::write(path, format!("{}\n", text))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Schema snapshot written to {}", path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}
