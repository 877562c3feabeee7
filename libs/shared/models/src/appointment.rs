use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::resource::{ResourceRef, ResourceType};

/// The central scheduling entity. Appointments are never deleted; terminal
/// states are retained for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub condition_id: Option<Uuid>,
    pub cancellation_reason: Option<String>,
    pub canceled_by: Option<CanceledBy>,
    pub denial_reason: Option<String>,
    pub resources: Vec<ResourceRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether this appointment still holds calendar and resource claims.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn resource_of_type(&self, resource_type: ResourceType) -> Option<&ResourceRef> {
        self.resources
            .iter()
            .find(|r| r.resource_type == resource_type)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Requested,
    Scheduled,
    Completed,
    Denied,
    Cancelled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Denied | AppointmentStatus::Cancelled
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Requested => write!(f, "requested"),
            AppointmentStatus::Scheduled => write!(f, "scheduled"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Denied => write!(f, "denied"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Events the state machine understands. Carried inside `InvalidTransition`
/// errors so callers see what was attempted from where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentEvent {
    Accept,
    Deny,
    Cancel,
    Reschedule,
    Complete,
    SetResources,
}

impl fmt::Display for AppointmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentEvent::Accept => write!(f, "accept"),
            AppointmentEvent::Deny => write!(f, "deny"),
            AppointmentEvent::Cancel => write!(f, "cancel"),
            AppointmentEvent::Reschedule => write!(f, "reschedule"),
            AppointmentEvent::Complete => write!(f, "complete"),
            AppointmentEvent::SetResources => write!(f, "set_resources"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    RegularCheck,
    FollowUp,
    Consultation,
    UrgentCare,
}

impl AppointmentType {
    /// Fixed duration per type; the slot grid stays advisory because these
    /// are not uniform.
    pub fn duration(&self) -> Duration {
        match self {
            AppointmentType::RegularCheck => Duration::minutes(30),
            AppointmentType::FollowUp => Duration::minutes(20),
            AppointmentType::Consultation => Duration::minutes(45),
            AppointmentType::UrgentCare => Duration::minutes(30),
        }
    }
}

impl fmt::Display for AppointmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentType::RegularCheck => write!(f, "regular_check"),
            AppointmentType::FollowUp => write!(f, "follow_up"),
            AppointmentType::Consultation => write!(f, "consultation"),
            AppointmentType::UrgentCare => write!(f, "urgent_care"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanceledBy {
    Patient,
    Doctor,
}

impl fmt::Display for CanceledBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanceledBy::Patient => write!(f, "patient"),
            CanceledBy::Doctor => write!(f, "doctor"),
        }
    }
}
