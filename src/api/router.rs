use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, checkout, get_open_entry, overdue, return_book};

/// Build the circulation API router.
///
/// - POST /checkout - create a ledger entry
/// - POST /entries/:id/return - close a ledger entry
/// - GET /entries/:id - open entry for the acting borrower
/// - GET /overdue - open, past-due entries
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/checkout", post(checkout))
        .route("/entries/:id", get(get_open_entry))
        .route("/entries/:id/return", post(return_book))
        .route("/overdue", get(overdue))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
