pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::report::handlers as report;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Report API
        .route("/api/v1/reports/layout", post(report::handle_layout))
        .route("/api/v1/reports/:drug", get(report::handle_download_report))
        .route(
            "/api/v1/reports/:drug/fields",
            get(report::handle_preview_report),
        )
        // Assistant API
        .route("/api/v1/toxicity", post(assistant::handle_toxicity))
        .route(
            "/api/v1/chat/sessions",
            post(assistant::handle_create_session),
        )
        .route(
            "/api/v1/chat/sessions/:id",
            get(assistant::handle_get_session).delete(assistant::handle_delete_session),
        )
        .route(
            "/api/v1/chat/sessions/:id/messages",
            post(assistant::handle_send_message),
        )
        .with_state(state)
}
