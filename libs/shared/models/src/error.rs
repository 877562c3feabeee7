use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::appointment::{AppointmentEvent, AppointmentStatus};

/// Domain error taxonomy shared by every cell. Each variant carries enough
/// context (entity id, current state, field name) for the caller to render
/// a specific message.
#[derive(Debug, Clone, Serialize, Deserialize, Error)]
pub enum SchedulingError {
    #[error("validation failed for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("doctor {doctor_id} is not free between {start} and {end}")]
    SlotUnavailable {
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("resource {resource_id} is already reserved for an overlapping window")]
    ResourceConflict { resource_id: Uuid },

    #[error("event {event} is not allowed while the appointment is {current}")]
    InvalidTransition {
        current: AppointmentStatus,
        event: AppointmentEvent,
    },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: Uuid },

    #[error("scheduling contention: {message}")]
    Contention { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },
}

impl SchedulingError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        SchedulingError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: &str, id: Uuid) -> Self {
        SchedulingError::NotFound {
            entity: entity.to_string(),
            id,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        SchedulingError::Forbidden {
            message: message.into(),
        }
    }

    /// Contention is the only kind worth retrying as-is; everything else
    /// needs a changed request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SchedulingError::Contention { .. })
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match &err {
            SchedulingError::Validation { .. } => AppError::BadRequest(err.to_string()),
            SchedulingError::SlotUnavailable { .. }
            | SchedulingError::ResourceConflict { .. }
            | SchedulingError::InvalidTransition { .. }
            | SchedulingError::Contention { .. } => AppError::Conflict(err.to_string()),
            SchedulingError::NotFound { .. } => AppError::NotFound(err.to_string()),
            SchedulingError::Forbidden { .. } => AppError::Forbidden(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        tracing::error!("Error: {}: {}", status, message);

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
