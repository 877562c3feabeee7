// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::actor_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppState>) -> Router {
    // Mutations resolve the acting identity from headers; listings and
    // detail reads are open.
    let acting_routes = Router::new()
        .route("/", post(handlers::schedule_appointment))
        .route("/{appointment_id}/accept", post(handlers::accept_appointment))
        .route("/{appointment_id}/deny", post(handlers::deny_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route("/{appointment_id}/reschedule", patch(handlers::reschedule_appointment))
        .route("/{appointment_id}/complete", post(handlers::complete_appointment))
        .route("/{appointment_id}/resources", post(handlers::set_appointment_resources))
        .layer(middleware::from_fn(actor_middleware));

    let listing_routes = Router::new()
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/patients/{patient_id}", get(handlers::get_patient_appointments))
        .route("/doctors/{doctor_id}", get(handlers::get_doctor_appointments));

    Router::new()
        .merge(acting_routes)
        .merge(listing_routes)
        .with_state(state)
}
