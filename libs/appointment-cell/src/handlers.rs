// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::actor::Actor;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    AcceptAppointmentRequest, CalendarQuery, CancelAppointmentRequest, DenyAppointmentRequest,
    RescheduleAppointmentRequest, ScheduleAppointmentRequest, SetResourcesRequest,
};
use crate::services::SchedulingEngine;

#[axum::debug_handler]
pub async fn schedule_appointment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<ScheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.schedule(actor, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let detail = engine.detail(appointment_id).await?;
    Ok(Json(json!(detail)))
}

#[axum::debug_handler]
pub async fn accept_appointment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AcceptAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.accept(actor, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn deny_appointment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<DenyAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.deny(actor, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<CancelAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.cancel(actor, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<RescheduleAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.reschedule(actor, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn complete_appointment(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.complete(actor, appointment_id).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn set_appointment_resources(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<SetResourcesRequest>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointment = engine.set_resources(actor, appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn get_patient_appointments(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointments = engine.patient_calendar(patient_id, query.from, query.to).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Value>, AppError> {
    let engine = SchedulingEngine::new(&state);
    let appointments = engine.doctor_calendar(doctor_id, query.from, query.to).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}
