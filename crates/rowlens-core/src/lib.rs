//! # rowlens-core
//!
//! Types shared across all rowlens crates:
//!
//! - configuration loaded from `rowlens.yaml`
//! - validated table identifiers and the prefix allow-list
//! - query parameters and pagination math
//! - the cell formatter that classifies raw database values for display
//! - the viewer state machine driving pagination, sorting and search

pub mod config;
pub mod format;
pub mod html;
pub mod query;
pub mod serialized;
pub mod table;
pub mod viewer;

pub use config::{
    CacheConfig, ConfigError, DashboardConfig, DatabaseConfig, LoggingConfig, RowlensConfig,
    ViewerConfig,
};
pub use format::{CellFormatter, CellKind, CellValue, FormattedCell, format_cell};
pub use query::{Pagination, SortOrder, TableQuery};
pub use table::{ColumnInfo, TableError, TableName, TablePattern};
pub use viewer::{Direction, FetchTicket, ViewerEvent, ViewerPhase, ViewerState};
