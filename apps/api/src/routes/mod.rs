pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/interviews", post(handlers::handle_create_interview))
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_interview).delete(handlers::handle_delete_interview),
        )
        .route(
            "/api/v1/interviews/:id/answers",
            post(handlers::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/conclude",
            post(handlers::handle_conclude),
        )
        .route(
            "/api/v1/interviews/:id/restart",
            post(handlers::handle_restart),
        )
        .route(
            "/api/v1/interviews/:id/transcript",
            get(handlers::handle_download_transcript),
        )
        .with_state(state)
}
