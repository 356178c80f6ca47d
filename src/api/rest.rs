// =============================================================================
// HTTP Endpoints — Axum 0.7
// =============================================================================
//
//   GET  /              dashboard page
//   GET  /about         static About page
//   GET  /contact       static Contact page
//   POST /_dash-update  form state in, chart + info panel out
//
// The update channel exists for the page's own script. It always answers 200
// with a valid view; fetch problems travel inside the view's `error` field.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::api::pages;
use crate::app_state::AppState;
use crate::dashboard::{self, FormState};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full router with request tracing and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/contact", get(contact))
        .route("/_dash-update", post(dashboard_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Pages
// =============================================================================

async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(pages::index(&state.config.default_indicators))
}

async fn about() -> impl IntoResponse {
    Html(pages::about())
}

async fn contact() -> impl IntoResponse {
    Html(pages::contact())
}

// =============================================================================
// Update channel
// =============================================================================

async fn dashboard_update(
    State(state): State<Arc<AppState>>,
    Json(form): Json<FormState>,
) -> impl IntoResponse {
    let view = dashboard::update(state.provider.as_ref(), &form).await;
    debug!(
        state = %view.state,
        traces = view.figure.trace_count(),
        has_error = view.error.is_some(),
        "update served"
    );
    Json(view)
}
