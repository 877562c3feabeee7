// libs/appointment-cell/src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shared_models::appointment::{Appointment, AppointmentEvent, AppointmentStatus, AppointmentType};
use shared_models::care::{Condition, Prescription};
use shared_models::people::{Doctor, Patient};
use shared_models::resource::Reservation;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleAppointmentRequest {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub reason: Option<String>,
    pub condition_id: Option<Uuid>,
}

/// At most one unit per kind, matching how an acceptance form offers them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSelection {
    pub facility_id: Option<Uuid>,
    pub equipment_id: Option<Uuid>,
    pub medicine_id: Option<Uuid>,
}

impl ResourceSelection {
    pub fn ids(&self) -> Vec<Uuid> {
        [self.facility_id, self.equipment_id, self.medicine_id]
            .into_iter()
            .flatten()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptAppointmentRequest {
    #[serde(default)]
    pub resources: ResourceSelection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DenyAppointmentRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleAppointmentRequest {
    pub new_start_time: DateTime<Utc>,
    pub new_doctor_id: Option<Uuid>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetResourcesRequest {
    pub resources: ResourceSelection,
}

/// Calendar listing window, inclusive of `from`, exclusive of `to`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

/// Compact calendar row with the counterpart names denormalised for
/// display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDisplay {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub doctor_id: Uuid,
    pub doctor_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
}

impl AppointmentDisplay {
    pub fn new(appointment: &Appointment, doctor_name: String, patient_name: String) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name,
            doctor_id: appointment.doctor_id,
            doctor_name,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            appointment_type: appointment.appointment_type,
            status: appointment.status,
        }
    }
}

/// Full appointment view: the entity with both parties and the linked
/// condition resolved, its reservation history, the prescriptions written
/// against it, and the events currently legal from its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub doctor: Doctor,
    pub patient: Patient,
    pub condition: Option<Condition>,
    pub reservations: Vec<Reservation>,
    pub prescriptions: Vec<Prescription>,
    pub available_events: Vec<AppointmentEvent>,
}
