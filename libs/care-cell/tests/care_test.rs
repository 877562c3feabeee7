use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use uuid::Uuid;

use care_cell::models::{
    CreateConditionRequest, CreatePrescriptionRequest, UpdatePrescriptionRequest,
};
use care_cell::services::{ConditionService, PrescriptionService};
use shared_models::actor::Actor;
use shared_models::appointment::{Appointment, AppointmentStatus, AppointmentType};
use shared_models::error::SchedulingError;
use shared_models::people::Specialization;
use shared_store::AppState;
use shared_utils::test_utils::{seed_doctor, seed_patient, test_state};

async fn seed_appointment(
    state: &AppState,
    doctor_id: Uuid,
    patient_id: Uuid,
    status: AppointmentStatus,
) -> Appointment {
    let start = Utc::now() + Duration::days(3);
    let appointment = Appointment {
        id: Uuid::new_v4(),
        patient_id,
        doctor_id,
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
async fn test_condition_toggle_flips_between_ongoing_and_ended() {
    let state = test_state();
    let patient = seed_patient(&state.store, "Reed").await;
    let conditions = ConditionService::new(&state);

    let condition = conditions
        .register_condition(
            Actor::patient(patient.id),
            CreateConditionRequest {
                patient_id: patient.id,
                name: "migraine".to_string(),
                start_date: Utc::now() - Duration::days(10),
                end_date: None,
            },
        )
        .await
        .unwrap();
    assert!(condition.is_ongoing());

    let ended = conditions
        .toggle_condition(Actor::patient(patient.id), condition.id)
        .await
        .unwrap();
    assert!(!ended.is_ongoing());
    let end_date = ended.end_date.unwrap();
    assert!(end_date >= condition.start_date && end_date <= Utc::now());

    let reopened = conditions
        .toggle_condition(Actor::patient(patient.id), condition.id)
        .await
        .unwrap();
    assert!(reopened.is_ongoing());
    assert!(reopened.end_date.is_none());
}

#[tokio::test]
async fn test_condition_toggle_requires_owner() {
    let state = test_state();
    let patient = seed_patient(&state.store, "Reed").await;
    let conditions = ConditionService::new(&state);

    let condition = conditions
        .register_condition(
            Actor::patient(patient.id),
            CreateConditionRequest {
                patient_id: patient.id,
                name: "migraine".to_string(),
                start_date: Utc::now() - Duration::days(10),
                end_date: None,
            },
        )
        .await
        .unwrap();

    let result = conditions
        .toggle_condition(Actor::patient(Uuid::new_v4()), condition.id)
        .await;
    assert_matches!(result, Err(SchedulingError::Forbidden { .. }));
}

#[tokio::test]
async fn test_condition_cannot_end_before_start() {
    let state = test_state();
    let patient = seed_patient(&state.store, "Reed").await;
    let conditions = ConditionService::new(&state);

    let start = Utc::now() - Duration::days(10);
    let result = conditions
        .register_condition(
            Actor::patient(patient.id),
            CreateConditionRequest {
                patient_id: patient.id,
                name: "migraine".to_string(),
                start_date: start,
                end_date: Some(start - Duration::days(1)),
            },
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Validation { .. }));
}

#[tokio::test]
async fn test_patient_cannot_touch_foreign_condition() {
    let state = test_state();
    let patient = seed_patient(&state.store, "Reed").await;
    let conditions = ConditionService::new(&state);

    let result = conditions
        .register_condition(
            Actor::patient(Uuid::new_v4()),
            CreateConditionRequest {
                patient_id: patient.id,
                name: "migraine".to_string(),
                start_date: Utc::now(),
                end_date: None,
            },
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Forbidden { .. }));
}

#[tokio::test]
async fn test_condition_detail_lists_linked_appointments() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;
    let conditions = ConditionService::new(&state);

    let condition = conditions
        .register_condition(
            Actor::patient(patient.id),
            CreateConditionRequest {
                patient_id: patient.id,
                name: "migraine".to_string(),
                start_date: Utc::now() - Duration::days(10),
                end_date: None,
            },
        )
        .await
        .unwrap();

    let mut appointment =
        seed_appointment(&state, doctor.id, patient.id, AppointmentStatus::Scheduled).await;
    appointment.condition_id = Some(condition.id);
    let linked = appointment.clone();
    state
        .store
        .write(move |s| {
            s.appointments.insert(linked.id, linked);
        })
        .await;
    seed_appointment(&state, doctor.id, patient.id, AppointmentStatus::Scheduled).await;

    let detail = conditions.condition_detail(condition.id).await.unwrap();
    assert_eq!(detail.appointments.len(), 1);
    assert_eq!(detail.appointments[0].id, appointment.id);
}

#[tokio::test]
async fn test_prescription_requires_doctor() {
    let state = test_state();
    let patient = seed_patient(&state.store, "Reed").await;
    let prescriptions = PrescriptionService::new(&state);

    let result = prescriptions
        .create_prescription(
            Actor::patient(patient.id),
            CreatePrescriptionRequest {
                patient_id: patient.id,
                appointment_id: None,
                name: "ibuprofen".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(14),
                doctors_note: None,
            },
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Forbidden { .. }));
}

#[tokio::test]
async fn test_prescription_against_appointment() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let other_doctor = seed_doctor(&state.store, "Banik", Specialization::Pediatrician).await;
    let patient = seed_patient(&state.store, "Reed").await;
    let prescriptions = PrescriptionService::new(&state);

    let appointment =
        seed_appointment(&state, doctor.id, patient.id, AppointmentStatus::Completed).await;
    let request = CreatePrescriptionRequest {
        patient_id: patient.id,
        appointment_id: Some(appointment.id),
        name: "ibuprofen".to_string(),
        start_date: Utc::now(),
        end_date: Utc::now() + Duration::days(14),
        doctors_note: Some("after meals".to_string()),
    };

    // Another doctor cannot prescribe against this appointment.
    let result = prescriptions
        .create_prescription(Actor::doctor(other_doctor.id), request.clone())
        .await;
    assert_matches!(result, Err(SchedulingError::Forbidden { .. }));

    let prescription = prescriptions
        .create_prescription(Actor::doctor(doctor.id), request)
        .await
        .unwrap();
    assert_eq!(prescription.appointment_id, Some(appointment.id));

    let listed = prescriptions
        .appointment_prescriptions(appointment.id)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_prescription_rejects_unheld_appointment() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;
    let prescriptions = PrescriptionService::new(&state);

    let appointment =
        seed_appointment(&state, doctor.id, patient.id, AppointmentStatus::Requested).await;

    let result = prescriptions
        .create_prescription(
            Actor::doctor(doctor.id),
            CreatePrescriptionRequest {
                patient_id: patient.id,
                appointment_id: Some(appointment.id),
                name: "ibuprofen".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(14),
                doctors_note: None,
            },
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Validation { .. }));
}

#[tokio::test]
async fn test_foreign_doctor_cannot_update_or_delete_linked_prescription() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let other_doctor = seed_doctor(&state.store, "Banik", Specialization::Pediatrician).await;
    let patient = seed_patient(&state.store, "Reed").await;
    let prescriptions = PrescriptionService::new(&state);

    let appointment =
        seed_appointment(&state, doctor.id, patient.id, AppointmentStatus::Scheduled).await;
    let prescription = prescriptions
        .create_prescription(
            Actor::doctor(doctor.id),
            CreatePrescriptionRequest {
                patient_id: patient.id,
                appointment_id: Some(appointment.id),
                name: "ibuprofen".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(14),
                doctors_note: None,
            },
        )
        .await
        .unwrap();

    let result = prescriptions
        .update_prescription(
            Actor::doctor(other_doctor.id),
            prescription.id,
            UpdatePrescriptionRequest {
                name: Some("morphine".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Forbidden { .. }));

    let result = prescriptions
        .delete_prescription(Actor::doctor(other_doctor.id), prescription.id)
        .await;
    assert_matches!(result, Err(SchedulingError::Forbidden { .. }));

    // The owning doctor still can.
    let updated = prescriptions
        .update_prescription(
            Actor::doctor(doctor.id),
            prescription.id,
            UpdatePrescriptionRequest {
                name: Some("paracetamol".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "paracetamol");
}

#[tokio::test]
async fn test_prescription_update_validates_span() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;
    let prescriptions = PrescriptionService::new(&state);

    let start = Utc::now();
    let prescription = prescriptions
        .create_prescription(
            Actor::doctor(doctor.id),
            CreatePrescriptionRequest {
                patient_id: patient.id,
                appointment_id: None,
                name: "ibuprofen".to_string(),
                start_date: start,
                end_date: start + Duration::days(14),
                doctors_note: None,
            },
        )
        .await
        .unwrap();

    let result = prescriptions
        .update_prescription(
            Actor::doctor(doctor.id),
            prescription.id,
            UpdatePrescriptionRequest {
                end_date: Some(start - Duration::days(1)),
                ..Default::default()
            },
        )
        .await;
    assert_matches!(result, Err(SchedulingError::Validation { .. }));

    let updated = prescriptions
        .update_prescription(
            Actor::doctor(doctor.id),
            prescription.id,
            UpdatePrescriptionRequest {
                doctors_note: Some("with water".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.doctors_note.as_deref(), Some("with water"));
}

#[tokio::test]
async fn test_prescription_delete() {
    let state = test_state();
    let doctor = seed_doctor(&state.store, "Novak", Specialization::GeneralPractitioner).await;
    let patient = seed_patient(&state.store, "Reed").await;
    let prescriptions = PrescriptionService::new(&state);

    let prescription = prescriptions
        .create_prescription(
            Actor::doctor(doctor.id),
            CreatePrescriptionRequest {
                patient_id: patient.id,
                appointment_id: None,
                name: "ibuprofen".to_string(),
                start_date: Utc::now(),
                end_date: Utc::now() + Duration::days(14),
                doctors_note: None,
            },
        )
        .await
        .unwrap();

    prescriptions
        .delete_prescription(Actor::doctor(doctor.id), prescription.id)
        .await
        .unwrap();

    let result = prescriptions
        .delete_prescription(Actor::doctor(doctor.id), prescription.id)
        .await;
    assert_matches!(result, Err(SchedulingError::NotFound { .. }));
}
