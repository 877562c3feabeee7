use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_store::AppState;

use crate::handlers;

pub fn resource_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(handlers::create_resource))
        .route("/", get(handlers::list_resources))
        .route("/available", get(handlers::get_available_resources))
        .route("/available/{resource_type}", get(handlers::get_available_by_type))
        .route("/{resource_id}", get(handlers::get_resource))
        .with_state(state)
}
