use crate::controller::health_check_controller;
use crate::sse::handler::sse_handler;
use crate::ws::handler::ws_handler;
use axum::{routing::get, Router};
use service::AppState;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(live_routes(app_state))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Both endpoints authenticate through the `token` query parameter.
fn live_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/events", get(sse_handler))
        .route("/ws", get(ws_handler))
        .with_state(app_state)
}
