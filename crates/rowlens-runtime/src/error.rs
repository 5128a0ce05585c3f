//! Error types for the runtime crate.

use rowlens_core::TableError;
use thiserror::Error;

/// What the client sees for any failure it cannot act on.
pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred while loading table data. Please try again.";

/// Errors raised by a [`TableSource`](crate::TableSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The database could not be reached.
    #[error("connection error: {0}")]
    Connection(String),

    /// A query failed.
    #[error("query failed: {0}")]
    Query(String),

    /// The table disappeared or cannot be read.
    #[error("table '{0}' is not accessible")]
    Inaccessible(String),
}

/// Errors raised by the [`TableViewer`](crate::TableViewer).
///
/// The first three variants carry the exact message returned to clients.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("Table name is required")]
    TableRequired,

    #[error("Table does not exist or is not accessible")]
    TableNotAccessible,

    #[error("Unable to get table structure")]
    Structure,

    #[error(transparent)]
    InvalidConfig(#[from] TableError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

impl ViewerError {
    /// Message safe to show to the client. Data-layer detail never leaks.
    pub fn user_message(&self) -> String {
        match self {
            ViewerError::TableRequired
            | ViewerError::TableNotAccessible
            | ViewerError::Structure => self.to_string(),
            ViewerError::InvalidConfig(_) | ViewerError::Source(_) => {
                GENERIC_ERROR_MESSAGE.to_string()
            }
        }
    }
}
