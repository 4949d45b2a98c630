// Route table for the Arbiter API
use crate::handlers;
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/judge/test", post(handlers::judge_test))
        .route("/judge/submit", post(handlers::judge_submit))
        .route("/status", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_export))
}
