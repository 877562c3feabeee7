// libs/resource-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shared_models::resource::{Resource, ResourceType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    pub name: String,
    pub resource_type: ResourceType,
}

/// Query window for availability listings. `duration_minutes` is resolved
/// against `start` so callers only pass the intended appointment window.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableQuery {
    pub start: DateTime<Utc>,
    pub duration_minutes: i64,
}

/// Free resource units for a window, grouped by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableResourcesResponse {
    pub facilities: Vec<Resource>,
    pub equipment: Vec<Resource>,
    pub medicine: Vec<Resource>,
}
