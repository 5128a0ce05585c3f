//! Request handlers for the dashboard.

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{Html, Redirect},
};

use crate::api_types::ViewQuery;
use crate::auth::principal;
use crate::embed::{self, snippet};
use crate::nonce::ACTION_ADMIN;
use crate::pages;
use crate::state::AppState;

fn nav_user(name: &str) -> Option<&str> {
    (!name.is_empty()).then_some(name)
}

// =============================================================================
// Page Handlers (HTML responses)
// =============================================================================

pub async fn index() -> Redirect {
    Redirect::to("/admin")
}

/// Handler for the admin table listing.
pub async fn admin(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let who = principal(&state, &headers);
    let viewer = state.viewer();
    let tables = viewer.list_tables().await;
    let nonce = state.nonces().create(ACTION_ADMIN, &who.username);

    Html(pages::admin_page(
        &tables,
        viewer.prefix(),
        state.config().viewer.per_page,
        &nonce,
        nav_user(&who.username),
    ))
}

/// Handler for the standalone viewer page (`/view?table=`).
pub async fn view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ViewQuery>,
) -> Html<String> {
    let who = principal(&state, &headers);
    let table = query
        .table
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| state.viewer().default_table().to_string());

    let expansion = embed::expand(&state, &snippet(&table), &who.username).await;
    Html(pages::view_page(&table, &expansion.html, nav_user(&who.username)))
}

// =============================================================================
// API Handlers (JSON responses)
// =============================================================================

pub mod api {
    use axum::{
        Json,
        extract::{Query, State, rejection::QueryRejection},
        http::HeaderMap,
        response::{IntoResponse, Response},
    };
    use rowlens_core::ViewerState;
    use rowlens_core::config::CAPABILITY_READ;
    use serde_json::json;

    use crate::api_types::{
        ApiResponse, FormOrJson, FragmentQuery, INVALID_REQUEST, RenderRequest, RenderResponse,
        TableCountsRequest, TableDataRequest,
    };
    use crate::auth::principal;
    use crate::embed;
    use crate::error::DashboardError;
    use crate::nonce::{ACTION_ADMIN, ACTION_TABLE_DATA};
    use crate::render;
    use crate::state::AppState;

    /// `POST /api/table-data`: one page of formatted rows.
    pub async fn table_data(
        State(state): State<AppState>,
        headers: HeaderMap,
        FormOrJson(req): FormOrJson<TableDataRequest>,
    ) -> Response {
        let who = principal(&state, &headers);
        if !state
            .nonces()
            .verify(ACTION_TABLE_DATA, &who.username, &req.nonce)
        {
            tracing::debug!(table = %req.table, "Table data request failed the security check");
            return DashboardError::SecurityCheckFailed.into_response();
        }

        let viewer = state.viewer();
        let query = viewer.query(
            req.page,
            req.per_page,
            req.search.as_deref(),
            req.orderby.as_deref(),
            req.order.as_deref(),
        );

        match viewer.table_data(&req.table, &query).await {
            Ok(page) => ApiResponse::ok(page),
            Err(e) => ApiResponse::fail(e.user_message()),
        }
    }

    /// `POST /api/table-counts`: row count of every listed table.
    pub async fn table_counts(
        State(state): State<AppState>,
        headers: HeaderMap,
        FormOrJson(req): FormOrJson<TableCountsRequest>,
    ) -> Response {
        let who = principal(&state, &headers);
        if !state.nonces().verify(ACTION_ADMIN, &who.username, &req.nonce) {
            return DashboardError::SecurityCheckFailed.into_response();
        }
        if !who.can(CAPABILITY_READ) {
            tracing::debug!(user = %who.username, "Row counts denied without read capability");
            return DashboardError::InsufficientPermissions.into_response();
        }

        ApiResponse::ok(state.viewer().table_counts().await)
    }

    /// `GET /fragments/table`: rendered markup for one viewer fetch.
    pub async fn fragment(
        State(state): State<AppState>,
        headers: HeaderMap,
        query: Result<Query<FragmentQuery>, QueryRejection>,
    ) -> Response {
        let Ok(Query(params)) = query else {
            return ApiResponse::fail(INVALID_REQUEST);
        };
        let who = principal(&state, &headers);
        if !state
            .nonces()
            .verify(ACTION_TABLE_DATA, &who.username, &params.nonce)
        {
            return DashboardError::SecurityCheckFailed.into_response();
        }

        let viewer = state.viewer();
        let mut viewer_state = ViewerState::new(viewer.query(
            params.page,
            params.per_page,
            params.search.as_deref(),
            params.orderby.as_deref(),
            params.order.as_deref(),
        ));
        let ticket = viewer_state.begin();

        match viewer.table_data(&params.table, &ticket.query).await {
            Ok(page) => {
                viewer_state.complete(ticket.seq, Ok(page.pagination));
                ApiResponse::ok(render::fragment(params.seq, &page, &viewer_state))
            }
            Err(e) => ApiResponse::fail(e.user_message()),
        }
    }

    /// `POST /api/render`: expand embeds in submitted content.
    pub async fn render(
        State(state): State<AppState>,
        headers: HeaderMap,
        FormOrJson(req): FormOrJson<RenderRequest>,
    ) -> Response {
        let who = principal(&state, &headers);
        let expansion = embed::expand(&state, &req.content, &who.username).await;
        ApiResponse::ok(RenderResponse {
            html: expansion.html,
            tables: expansion.tables,
        })
    }

    pub async fn healthz() -> Response {
        Json(json!({ "ok": true, "service": "rowlens-dashboard" })).into_response()
    }
}
