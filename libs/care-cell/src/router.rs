// libs/care-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::actor_middleware;

use crate::handlers;

pub fn condition_routes(state: Arc<AppState>) -> Router {
    let acting_routes = Router::new()
        .route("/", post(handlers::register_condition))
        .route("/{condition_id}/toggle", post(handlers::toggle_condition))
        .layer(middleware::from_fn(actor_middleware));

    let listing_routes = Router::new()
        .route("/{condition_id}", get(handlers::get_condition))
        .route("/patients/{patient_id}", get(handlers::get_patient_conditions));

    Router::new()
        .merge(acting_routes)
        .merge(listing_routes)
        .with_state(state)
}

pub fn prescription_routes(state: Arc<AppState>) -> Router {
    let acting_routes = Router::new()
        .route("/", post(handlers::create_prescription))
        .route("/{prescription_id}", put(handlers::update_prescription))
        .route("/{prescription_id}", delete(handlers::delete_prescription))
        .layer(middleware::from_fn(actor_middleware));

    let listing_routes = Router::new()
        .route("/patients/{patient_id}", get(handlers::get_patient_prescriptions));

    Router::new()
        .merge(acting_routes)
        .merge(listing_routes)
        .with_state(state)
}
