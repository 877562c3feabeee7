// libs/care-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::actor::Actor;
use shared_models::error::AppError;
use shared_store::AppState;

use crate::models::{
    CreateConditionRequest, CreatePrescriptionRequest, UpdatePrescriptionRequest,
};
use crate::services::{ConditionService, PrescriptionService};

#[axum::debug_handler]
pub async fn register_condition(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateConditionRequest>,
) -> Result<Json<Value>, AppError> {
    let conditions = ConditionService::new(&state);
    let condition = conditions.register_condition(actor, request).await?;
    Ok(Json(json!(condition)))
}

#[axum::debug_handler]
pub async fn toggle_condition(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(condition_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let conditions = ConditionService::new(&state);
    let condition = conditions.toggle_condition(actor, condition_id).await?;
    Ok(Json(json!(condition)))
}

#[axum::debug_handler]
pub async fn get_condition(
    State(state): State<Arc<AppState>>,
    Path(condition_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let conditions = ConditionService::new(&state);
    let detail = conditions.condition_detail(condition_id).await?;
    Ok(Json(json!(detail)))
}

#[axum::debug_handler]
pub async fn get_patient_conditions(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let conditions = ConditionService::new(&state);
    let listing = conditions.patient_conditions(patient_id).await?;

    Ok(Json(json!({
        "conditions": listing,
        "total": listing.len()
    })))
}

#[axum::debug_handler]
pub async fn create_prescription(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreatePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = PrescriptionService::new(&state);
    let prescription = prescriptions.create_prescription(actor, request).await?;
    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn update_prescription(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(prescription_id): Path<Uuid>,
    Json(request): Json<UpdatePrescriptionRequest>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = PrescriptionService::new(&state);
    let prescription = prescriptions
        .update_prescription(actor, prescription_id, request)
        .await?;
    Ok(Json(json!(prescription)))
}

#[axum::debug_handler]
pub async fn delete_prescription(
    State(state): State<Arc<AppState>>,
    Extension(actor): Extension<Actor>,
    Path(prescription_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = PrescriptionService::new(&state);
    prescriptions.delete_prescription(actor, prescription_id).await?;
    Ok(Json(json!({ "deleted": true })))
}

#[axum::debug_handler]
pub async fn get_patient_prescriptions(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let prescriptions = PrescriptionService::new(&state);
    let listing = prescriptions.patient_prescriptions(patient_id).await?;

    Ok(Json(json!({
        "prescriptions": listing,
        "total": listing.len()
    })))
}
