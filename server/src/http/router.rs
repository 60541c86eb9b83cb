use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use super::handlers::{get_alert_by_id, get_alerts_by_range, put_alert, status};
use super::state::AppState;

/// Webhook batches stay small; 1 MiB leaves ample headroom.
const MAX_BODY_SIZE: usize = 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/alert", get(get_alerts_by_range).post(put_alert))
        .route("/alert/{id}", get(get_alert_by_id))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}
