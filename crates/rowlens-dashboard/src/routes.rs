//! Route definitions for the dashboard.

use axum::{
    Router, middleware,
    response::Response,
    routing::{get, post},
};
use rowlens_runtime::GENERIC_ERROR_MESSAGE;
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::api_types::ApiResponse;
use crate::state::AppState;
use crate::{assets, auth, handlers};

/// A panicking handler answers with the generic failure envelope.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("non-string panic payload");
    tracing::error!(panic = %detail, "Request handler panicked");
    ApiResponse::fail(GENERIC_ERROR_MESSAGE)
}

/// Create the dashboard router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/admin", get(handlers::admin))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_read,
        ));

    Router::new()
        .route("/", get(handlers::index))
        .route("/view", get(handlers::view))
        .route("/login", get(auth::login_page).post(auth::login_submit))
        .route("/logout", get(auth::logout))
        .route("/api/table-data", post(handlers::api::table_data))
        .route("/api/table-counts", post(handlers::api::table_counts))
        .route("/api/render", post(handlers::api::render))
        .route("/fragments/table", get(handlers::api::fragment))
        .route("/assets/{*path}", get(assets::serve))
        .route("/healthz", get(handlers::api::healthz))
        .merge(protected)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
