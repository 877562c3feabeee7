use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use doctor_cell::services::AvailabilityService;
use shared_models::appointment::{Appointment, AppointmentStatus, AppointmentType};
use shared_models::error::SchedulingError;
use shared_models::people::{SlotStatus, Specialization};
use shared_store::AppState;
use shared_utils::test_utils::{seed_doctor, seed_patient, test_day_start, test_state};

async fn seed_appointment(
    state: &AppState,
    doctor_id: Uuid,
    patient_id: Uuid,
    start: chrono::DateTime<Utc>,
    status: AppointmentStatus,
) -> Appointment {
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id,
        start_time: start,
        end_time: start + AppointmentType::RegularCheck.duration(),
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
    };
    let stored = appointment.clone();
    state
        .store
        .write(move |s| {
            s.appointments.insert(stored.id, stored);
        })
        .await;
    appointment
}

#[tokio::test]
async fn test_slot_grid_covers_clinic_hours() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;

    let service = AvailabilityService::new(&state);
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    // Pin "now" before the day so nothing is in the past.
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();

    let slots = service.list_slots_at(doctor.id, date, now).await.unwrap();

    // 8:00 to 16:00 in 60-minute steps.
    assert_eq!(slots.len(), 8);
    assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
    assert_eq!(slots[0].start_time, Utc.with_ymd_and_hms(2025, 5, 1, 8, 0, 0).unwrap());
    assert_eq!(
        slots.last().unwrap().end_time,
        Utc.with_ymd_and_hms(2025, 5, 1, 16, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_booked_slot_is_unavailable() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;

    // Appointment 9:00-9:30 should shadow the 9:00-10:00 slot only.
    let start = test_day_start() + Duration::hours(9);
    seed_appointment(&state, doctor.id, patient.id, start, AppointmentStatus::Scheduled).await;

    let service = AvailabilityService::new(&state);
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();

    let slots = service.list_slots_at(doctor.id, date, now).await.unwrap();

    let nine = slots.iter().find(|s| s.start_time == start).unwrap();
    assert_eq!(nine.status, SlotStatus::Unavailable);
    let unavailable = slots.iter().filter(|s| s.status == SlotStatus::Unavailable).count();
    assert_eq!(unavailable, 1);
}

#[tokio::test]
async fn test_cancelled_appointment_frees_slot() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;

    let start = test_day_start() + Duration::hours(10);
    seed_appointment(&state, doctor.id, patient.id, start, AppointmentStatus::Cancelled).await;

    let service = AvailabilityService::new(&state);
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap();

    let slots = service.list_slots_at(doctor.id, date, now).await.unwrap();
    assert!(slots.iter().all(|s| s.status == SlotStatus::Available));
}

#[tokio::test]
async fn test_past_slots_are_unavailable() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;

    let service = AvailabilityService::new(&state);
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();
    // Mid-day: the 8:00-12:00 starts lie in the past.
    let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 30, 0).unwrap();

    let slots = service.list_slots_at(doctor.id, date, now).await.unwrap();

    for slot in &slots {
        if slot.start_time < now {
            assert_eq!(slot.status, SlotStatus::Unavailable);
        } else {
            assert_eq!(slot.status, SlotStatus::Available);
        }
    }
    let available = slots.iter().filter(|s| s.status == SlotStatus::Available).count();
    assert_eq!(available, 3);
}

#[tokio::test]
async fn test_slots_for_unknown_doctor() {
    let state = test_state();
    let service = AvailabilityService::new(&state);
    let date = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();

    let result = service.list_slots(Uuid::new_v4(), date).await;
    assert_matches!(result, Err(SchedulingError::NotFound { .. }));
}

#[tokio::test]
async fn test_window_free_excludes_given_appointment() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;

    let start = test_day_start() + Duration::hours(9);
    let appointment =
        seed_appointment(&state, doctor.id, patient.id, start, AppointmentStatus::Scheduled).await;

    let service = AvailabilityService::new(&state);
    let end = start + Duration::minutes(30);

    let blocked = service.is_window_free(doctor.id, start, end, None).await.unwrap();
    assert!(!blocked);

    // Excluding the appointment itself (reschedule case) frees the window.
    let free = service
        .is_window_free(doctor.id, start, end, Some(appointment.id))
        .await
        .unwrap();
    assert!(free);
}

#[tokio::test]
async fn test_inverted_window_is_rejected() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;

    let service = AvailabilityService::new(&state);
    let start = test_day_start() + Duration::hours(9);

    let result = service
        .is_window_free(doctor.id, start, start - Duration::minutes(30), None)
        .await;
    assert_matches!(result, Err(SchedulingError::Validation { .. }));
}
