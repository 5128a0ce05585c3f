//! Configuration types for rowlens.
//!
//! Configuration is loaded from a single YAML file (`rowlens.yaml`). Every
//! section has defaults, so an empty file is a valid configuration that
//! points at a local Postgres and uses the `wp_` table prefix.

pub mod dashboard;
pub mod database;
pub mod viewer;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use dashboard::{AuthConfig, CAPABILITY_READ, DashboardConfig, DashboardUser};
pub use database::DatabaseConfig;
pub use viewer::{CacheConfig, ViewerConfig};

/// Complete rowlens configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RowlensConfig {
    /// Database connection.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Table viewer behaviour.
    #[serde(default)]
    pub viewer: ViewerConfig,

    /// Cache lifetimes.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Dashboard server.
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl RowlensConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Check the configuration for values that would make the viewer unusable.
    ///
    /// Returns every problem found rather than stopping at the first one.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if let Err(e) = crate::table::TablePattern::new(&self.viewer.table_prefix) {
            problems.push(format!("viewer.table_prefix: {}", e));
        } else {
            let default_table = self.viewer.default_table();
            if !default_table.starts_with(&self.viewer.table_prefix) {
                problems.push(format!(
                    "viewer.default_table '{}' does not start with prefix '{}'",
                    default_table, self.viewer.table_prefix
                ));
            }
        }

        if self.viewer.per_page == 0 || self.viewer.per_page > self.viewer.max_per_page {
            problems.push(format!(
                "viewer.per_page must be between 1 and {} (got {})",
                self.viewer.max_per_page, self.viewer.per_page
            ));
        }

        if self.viewer.max_per_page == 0 || self.viewer.max_per_page > crate::query::MAX_PER_PAGE {
            problems.push(format!(
                "viewer.max_per_page must be between 1 and {} (got {})",
                crate::query::MAX_PER_PAGE,
                self.viewer.max_per_page
            ));
        }

        if self.viewer.long_text_threshold == 0 {
            problems.push("viewer.long_text_threshold must be positive".to_string());
        }

        for user in &self.dashboard.auth.users {
            if user.get_password().is_none() {
                problems.push(format!(
                    "dashboard.auth.users: user '{}' has no password (set password or password_env)",
                    user.username
                ));
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = RowlensConfig::from_yaml("").unwrap();
        assert_eq!(config.viewer.table_prefix, "wp_");
        assert_eq!(config.viewer.default_table(), "wp_options");
        assert_eq!(config.dashboard.port, 8080);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "viewer:\n  table_prefix: blog_\n  per_page: 50\ncache:\n  counts_ttl_secs: 60\n"
        )
        .unwrap();

        let config = RowlensConfig::from_file(file.path()).unwrap();
        assert_eq!(config.viewer.table_prefix, "blog_");
        assert_eq!(config.viewer.per_page, 50);
        assert_eq!(config.cache.counts_ttl_secs, 60);
        assert_eq!(config.cache.tables_ttl_secs, 300);
    }

    #[test]
    fn validate_reports_all_problems() {
        let yaml = r#"
viewer:
  table_prefix: "wp-"
  per_page: 0
dashboard:
  auth:
    users:
      - username: admin
"#;
        let config = RowlensConfig::from_yaml(yaml).unwrap();
        let problems = config.validate();
        assert_eq!(problems.len(), 3, "{:?}", problems);
        assert!(problems.iter().any(|p| p.contains("table_prefix")));
        assert!(problems.iter().any(|p| p.contains("per_page")));
        assert!(problems.iter().any(|p| p.contains("admin")));
    }

    #[test]
    fn default_table_must_match_prefix() {
        let yaml = "viewer:\n  table_prefix: wp_\n  default_table: users\n";
        let config = RowlensConfig::from_yaml(yaml).unwrap();
        let problems = config.validate();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("default_table"));
    }
}
