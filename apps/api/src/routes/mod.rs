pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::rate_limit::rate_limit;
use crate::state::AppState;
use crate::{auth, jobs, matching, resumes};

/// Uploads can carry archives; the default 2 MB body cap is too small.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    // Rate limiting covers the API surface only. /health stays open so
    // probes never burn the caller's budget.
    let api = Router::new()
        // Accounts
        .route("/api/register", post(auth::handlers::handle_register))
        .route("/api/login", post(auth::handlers::handle_login))
        // Resumes
        .route(
            "/api/resumes",
            post(resumes::handlers::handle_upload).get(resumes::handlers::handle_list),
        )
        .route("/api/resumes/:id", get(resumes::handlers::handle_get))
        // Jobs
        .route("/api/jobs", post(jobs::handlers::handle_create))
        .route("/api/jobs/:id", get(jobs::handlers::handle_get))
        // Matching
        .route("/api/jobs/:id/match", post(matching::handlers::handle_match))
        .route("/api/ask", post(matching::handlers::handle_ask))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health::health_handler))
        .merge(api)
        .with_state(state)
}
