use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Duration;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::error::AppError;
use shared_models::resource::ResourceType;
use shared_store::AppState;

use crate::models::{AvailableQuery, CreateResourceRequest};
use crate::services::InventoryService;

#[axum::debug_handler]
pub async fn create_resource(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateResourceRequest>,
) -> Result<Json<Value>, AppError> {
    let inventory = InventoryService::new(&state);
    let resource = inventory.create_resource(request).await?;
    Ok(Json(json!(resource)))
}

#[axum::debug_handler]
pub async fn list_resources(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let inventory = InventoryService::new(&state);
    let resources = inventory.list_resources().await;

    Ok(Json(json!({
        "resources": resources,
        "total": resources.len()
    })))
}

#[axum::debug_handler]
pub async fn get_resource(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let inventory = InventoryService::new(&state);
    let resource = inventory.get_resource(resource_id).await?;
    Ok(Json(json!(resource)))
}

#[axum::debug_handler]
pub async fn get_available_resources(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Value>, AppError> {
    let inventory = InventoryService::new(&state);
    let end = query.start + Duration::minutes(query.duration_minutes);
    let available = inventory.grouped_available(query.start, end).await?;
    Ok(Json(json!(available)))
}

#[axum::debug_handler]
pub async fn get_available_by_type(
    State(state): State<Arc<AppState>>,
    Path(resource_type): Path<ResourceType>,
    Query(query): Query<AvailableQuery>,
) -> Result<Json<Value>, AppError> {
    let inventory = InventoryService::new(&state);
    let end = query.start + Duration::minutes(query.duration_minutes);
    let resources = inventory.list_available(resource_type, query.start, end).await?;

    Ok(Json(json!({
        "resources": resources,
        "total": resources.len()
    })))
}
