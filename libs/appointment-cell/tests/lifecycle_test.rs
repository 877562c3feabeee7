use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use appointment_cell::services::AppointmentLifecycle;
use shared_models::actor::Actor;
use shared_models::appointment::{
    Appointment, AppointmentEvent, AppointmentStatus, AppointmentType,
};
use shared_models::error::SchedulingError;

fn appointment(status: AppointmentStatus) -> Appointment {
    let start = Utc::now() + Duration::days(1);
    Appointment {
        id: Uuid::new_v4(),
        patient_id: Uuid::new_v4(),
        doctor_id: Uuid::new_v4(),
        start_time: start,
        end_time: start + Duration::minutes(30),
        appointment_type: AppointmentType::RegularCheck,
        status,
        reason: None,
        condition_id: None,
        cancellation_reason: None,
        canceled_by: None,
        denial_reason: None,
        resources: Vec::new(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[test]
fn test_requested_transitions() {
    assert_eq!(
        AppointmentLifecycle::ensure_transition(
            AppointmentStatus::Requested,
            AppointmentEvent::Accept
        )
        .unwrap(),
        AppointmentStatus::Scheduled
    );
    assert_eq!(
        AppointmentLifecycle::ensure_transition(AppointmentStatus::Requested, AppointmentEvent::Deny)
            .unwrap(),
        AppointmentStatus::Denied
    );
    assert_eq!(
        AppointmentLifecycle::ensure_transition(
            AppointmentStatus::Requested,
            AppointmentEvent::Cancel
        )
        .unwrap(),
        AppointmentStatus::Cancelled
    );

    // Resources may be lined up before acceptance; completion needs a
    // held slot first.
    assert_eq!(
        AppointmentLifecycle::ensure_transition(
            AppointmentStatus::Requested,
            AppointmentEvent::SetResources
        )
        .unwrap(),
        AppointmentStatus::Requested
    );
    assert!(AppointmentLifecycle::ensure_transition(
        AppointmentStatus::Requested,
        AppointmentEvent::Complete
    )
    .is_err());
}

#[test]
fn test_scheduled_transitions() {
    assert_eq!(
        AppointmentLifecycle::ensure_transition(
            AppointmentStatus::Scheduled,
            AppointmentEvent::Complete
        )
        .unwrap(),
        AppointmentStatus::Completed
    );
    assert!(AppointmentLifecycle::ensure_transition(
        AppointmentStatus::Scheduled,
        AppointmentEvent::Accept
    )
    .is_err());
    assert!(AppointmentLifecycle::ensure_transition(
        AppointmentStatus::Scheduled,
        AppointmentEvent::Deny
    )
    .is_err());
}

#[test]
fn test_terminal_statuses_admit_nothing() {
    let terminals = [
        AppointmentStatus::Completed,
        AppointmentStatus::Denied,
        AppointmentStatus::Cancelled,
    ];
    let events = [
        AppointmentEvent::Accept,
        AppointmentEvent::Deny,
        AppointmentEvent::Cancel,
        AppointmentEvent::Reschedule,
        AppointmentEvent::Complete,
        AppointmentEvent::SetResources,
    ];

    for status in terminals {
        assert!(AppointmentLifecycle::valid_events(status).is_empty());
        for event in events {
            assert_matches!(
                AppointmentLifecycle::ensure_transition(status, event),
                Err(SchedulingError::InvalidTransition { .. })
            );
        }
    }
}

#[test]
fn test_reschedule_resets_approval() {
    assert_eq!(
        AppointmentLifecycle::ensure_transition(
            AppointmentStatus::Scheduled,
            AppointmentEvent::Reschedule
        )
        .unwrap(),
        AppointmentStatus::Requested
    );

    // A pending request is moved by cancelling and re-requesting, not by
    // rescheduling.
    assert_matches!(
        AppointmentLifecycle::ensure_transition(
            AppointmentStatus::Requested,
            AppointmentEvent::Reschedule
        ),
        Err(SchedulingError::InvalidTransition { .. })
    );
}

#[test]
fn test_decisions_belong_to_owning_doctor() {
    let appt = appointment(AppointmentStatus::Requested);

    assert!(AppointmentLifecycle::authorize(
        Actor::doctor(appt.doctor_id),
        AppointmentEvent::Accept,
        &appt
    )
    .is_ok());
    assert!(AppointmentLifecycle::authorize(
        Actor::doctor(Uuid::new_v4()),
        AppointmentEvent::Accept,
        &appt
    )
    .is_err());
    assert!(AppointmentLifecycle::authorize(
        Actor::patient(appt.patient_id),
        AppointmentEvent::Deny,
        &appt
    )
    .is_err());
}

#[test]
fn test_cancel_authorization_depends_on_status() {
    let requested = appointment(AppointmentStatus::Requested);
    assert!(AppointmentLifecycle::authorize(
        Actor::patient(requested.patient_id),
        AppointmentEvent::Cancel,
        &requested
    )
    .is_ok());
    assert!(AppointmentLifecycle::authorize(
        Actor::doctor(requested.doctor_id),
        AppointmentEvent::Cancel,
        &requested
    )
    .is_err());

    let scheduled = appointment(AppointmentStatus::Scheduled);
    assert!(AppointmentLifecycle::authorize(
        Actor::patient(scheduled.patient_id),
        AppointmentEvent::Cancel,
        &scheduled
    )
    .is_ok());
    assert!(AppointmentLifecycle::authorize(
        Actor::doctor(scheduled.doctor_id),
        AppointmentEvent::Cancel,
        &scheduled
    )
    .is_ok());
    assert!(AppointmentLifecycle::authorize(
        Actor::patient(Uuid::new_v4()),
        AppointmentEvent::Cancel,
        &scheduled
    )
    .is_err());
}

#[test]
fn test_either_owning_party_may_reschedule() {
    let appt = appointment(AppointmentStatus::Scheduled);
    assert!(AppointmentLifecycle::authorize(
        Actor::patient(appt.patient_id),
        AppointmentEvent::Reschedule,
        &appt
    )
    .is_ok());
    assert!(AppointmentLifecycle::authorize(
        Actor::doctor(appt.doctor_id),
        AppointmentEvent::Reschedule,
        &appt
    )
    .is_ok());
    assert!(AppointmentLifecycle::authorize(
        Actor::doctor(Uuid::new_v4()),
        AppointmentEvent::Reschedule,
        &appt
    )
    .is_err());
}
