// libs/appointment-cell/src/services/lifecycle.rs
use tracing::{debug, warn};

use shared_models::actor::Actor;
use shared_models::appointment::{Appointment, AppointmentEvent, AppointmentStatus};
use shared_models::error::SchedulingError;

/// The appointment state machine and its authorization rules. Pure
/// functions over the entity; the engine applies them inside its atomic
/// write sections.
pub struct AppointmentLifecycle;

impl AppointmentLifecycle {
    /// Events that are legal from a status, in the order a UI would offer
    /// them. Terminal statuses admit nothing.
    pub fn valid_events(status: AppointmentStatus) -> Vec<AppointmentEvent> {
        match status {
            AppointmentStatus::Requested => vec![
                AppointmentEvent::Accept,
                AppointmentEvent::Deny,
                AppointmentEvent::Cancel,
                AppointmentEvent::SetResources,
            ],
            AppointmentStatus::Scheduled => vec![
                AppointmentEvent::Complete,
                AppointmentEvent::Cancel,
                AppointmentEvent::Reschedule,
                AppointmentEvent::SetResources,
            ],
            AppointmentStatus::Completed
            | AppointmentStatus::Denied
            | AppointmentStatus::Cancelled => vec![],
        }
    }

    /// Resolve the status an event leads to, or reject the transition.
    pub fn ensure_transition(
        current: AppointmentStatus,
        event: AppointmentEvent,
    ) -> Result<AppointmentStatus, SchedulingError> {
        debug!("resolving transition {} from {}", event, current);

        let target = match (current, event) {
            (AppointmentStatus::Requested, AppointmentEvent::Accept) => {
                AppointmentStatus::Scheduled
            }
            (AppointmentStatus::Requested, AppointmentEvent::Deny) => AppointmentStatus::Denied,
            (AppointmentStatus::Requested, AppointmentEvent::Cancel)
            | (AppointmentStatus::Scheduled, AppointmentEvent::Cancel) => {
                AppointmentStatus::Cancelled
            }
            // Moving a held appointment voids the doctor's acceptance; it
            // goes back through the decision step.
            (AppointmentStatus::Scheduled, AppointmentEvent::Reschedule) => {
                AppointmentStatus::Requested
            }
            (AppointmentStatus::Scheduled, AppointmentEvent::Complete) => {
                AppointmentStatus::Completed
            }
            // Resources may be lined up before the doctor has accepted.
            (AppointmentStatus::Requested, AppointmentEvent::SetResources) => {
                AppointmentStatus::Requested
            }
            (AppointmentStatus::Scheduled, AppointmentEvent::SetResources) => {
                AppointmentStatus::Scheduled
            }
            (current, event) => {
                warn!("rejected transition {} from {}", event, current);
                return Err(SchedulingError::InvalidTransition { current, event });
            }
        };
        Ok(target)
    }

    /// Whether the actor may fire an event against this appointment.
    /// Decide/complete/resource events belong to the appointment's doctor;
    /// cancellation of a pending request belongs to its patient; both
    /// owning parties may cancel or move a scheduled appointment.
    pub fn authorize(
        actor: Actor,
        event: AppointmentEvent,
        appointment: &Appointment,
    ) -> Result<(), SchedulingError> {
        let is_owning_doctor = actor.is_doctor() && actor.id == appointment.doctor_id;
        let is_owning_patient = actor.is_patient() && actor.id == appointment.patient_id;

        let allowed = match event {
            AppointmentEvent::Accept
            | AppointmentEvent::Deny
            | AppointmentEvent::Complete
            | AppointmentEvent::SetResources => is_owning_doctor,
            AppointmentEvent::Cancel => match appointment.status {
                AppointmentStatus::Requested => is_owning_patient,
                _ => is_owning_doctor || is_owning_patient,
            },
            AppointmentEvent::Reschedule => is_owning_doctor || is_owning_patient,
        };

        if !allowed {
            return Err(SchedulingError::forbidden(format!(
                "{} {} may not {} appointment {}",
                actor.role, actor.id, event, appointment.id
            )));
        }
        Ok(())
    }
}
