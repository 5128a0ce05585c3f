//! Error types for the dashboard crate.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api_types::ApiResponse;

/// Errors that can occur in the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Failed to start the server.
    #[error("failed to start dashboard: {0}")]
    StartupFailed(String),

    /// Anti-forgery token missing or invalid.
    #[error("Security check failed")]
    SecurityCheckFailed,

    /// The user lacks the capability the route needs.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Token and permission failures are answered on the API's terms: the
/// `{success: false, data: <message>}` envelope with HTTP 200.
impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let status = match &self {
            DashboardError::SecurityCheckFailed | DashboardError::InsufficientPermissions => {
                return ApiResponse::fail(self.to_string());
            }
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::StartupFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
