use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use care_cell::router::{condition_routes, prescription_routes};
use doctor_cell::router::doctor_routes;
use patient_cell::router::patient_routes;
use resource_cell::router::resource_routes;
use shared_store::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "Clinic scheduling API is running" }))
        .nest("/api/doctors", doctor_routes(state.clone()))
        .nest("/api/patients", patient_routes(state.clone()))
        .nest("/api/resources", resource_routes(state.clone()))
        .nest("/api/appointments", appointment_routes(state.clone()))
        .nest("/api/conditions", condition_routes(state.clone()))
        .nest("/api/prescriptions", prescription_routes(state))
}
