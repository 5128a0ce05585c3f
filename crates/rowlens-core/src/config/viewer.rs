//! Viewer and cache configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the table viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Prefix every viewable table must carry (e.g. `wp_`).
    #[serde(default = "default_table_prefix")]
    pub table_prefix: String,

    /// Table shown by an embed without a `table` attribute.
    /// Defaults to `<prefix>options`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_table: Option<String>,

    /// Rows per page requested by the viewer.
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Upper bound applied to any requested page size.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,

    /// Characters after which text is truncated in the table.
    #[serde(default = "default_long_text_threshold")]
    pub long_text_threshold: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            table_prefix: default_table_prefix(),
            default_table: None,
            per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            long_text_threshold: default_long_text_threshold(),
        }
    }
}

impl ViewerConfig {
    /// The table used when an embed names none.
    pub fn default_table(&self) -> String {
        self.default_table
            .clone()
            .unwrap_or_else(|| format!("{}options", self.table_prefix))
    }
}

/// Cache lifetimes, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of the table list snapshot.
    #[serde(default = "default_tables_ttl")]
    pub tables_ttl_secs: u64,

    /// Lifetime of a cached per-table row count.
    #[serde(default = "default_counts_ttl")]
    pub counts_ttl_secs: u64,

    /// Lifetime of a cached column list.
    #[serde(default = "default_columns_ttl")]
    pub columns_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            tables_ttl_secs: default_tables_ttl(),
            counts_ttl_secs: default_counts_ttl(),
            columns_ttl_secs: default_columns_ttl(),
        }
    }
}

impl CacheConfig {
    pub fn tables_ttl(&self) -> Duration {
        Duration::from_secs(self.tables_ttl_secs)
    }

    pub fn counts_ttl(&self) -> Duration {
        Duration::from_secs(self.counts_ttl_secs)
    }

    pub fn columns_ttl(&self) -> Duration {
        Duration::from_secs(self.columns_ttl_secs)
    }
}

fn default_table_prefix() -> String {
    "wp_".to_string()
}

fn default_per_page() -> u32 {
    20
}

fn default_max_per_page() -> u32 {
    1000
}

fn default_long_text_threshold() -> usize {
    100
}

fn default_tables_ttl() -> u64 {
    300
}

fn default_counts_ttl() -> u64 {
    300
}

fn default_columns_ttl() -> u64 {
    3600
}
