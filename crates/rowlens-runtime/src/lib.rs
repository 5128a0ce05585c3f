//! # rowlens-runtime
//!
//! The [`TableSource`] seam between the viewer and a database, an in-memory
//! source for tests and demos, expiring caches, and the [`TableViewer`]
//! service that implements table listing, row counts and paged table data.

pub mod cache;
pub mod demo;
pub mod error;
pub mod memory;
pub mod service;
pub mod source;

pub use cache::TtlCache;
pub use error::{GENERIC_ERROR_MESSAGE, SourceError, ViewerError};
pub use memory::{FailingQuery, MemorySource};
pub use service::{FormattedRow, TableCount, TablePage, TableViewer, UNABLE_TO_ACCESS_TABLE};
pub use source::{Row, RowFilter, RowRequest, SortSpec, TableSource};
