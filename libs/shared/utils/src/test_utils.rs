//! Fixtures shared by cell test suites. Compiled into the crate so
//! downstream integration tests can use them, same as the store itself.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::people::{Doctor, Patient, Specialization};
use shared_models::resource::{Resource, ResourceType};
use shared_store::{AppState, ClinicStore};

pub fn test_config() -> AppConfig {
    AppConfig {
        port: 0,
        open_hour: 8,
        close_hour: 16,
        slot_minutes: 60,
        clinic_utc_offset_minutes: 0,
        direct_booking: true,
        max_lock_attempts: 3,
        lock_ttl_seconds: 30,
    }
}

pub fn test_state() -> AppState {
    AppState::new(test_config())
}

pub async fn seed_doctor(store: &ClinicStore, name: &str, spec: Specialization) -> Doctor {
    let doctor = Doctor {
        id: Uuid::new_v4(),
        first_name: name.to_string(),
        last_name: "Doktor".to_string(),
        email: format!("{}@clinic.test", name.to_lowercase()),
        specialization: spec,
    };
    let cloned = doctor.clone();
    store
        .write(move |state| {
            state.doctors.insert(cloned.id, cloned);
        })
        .await;
    doctor
}

pub async fn seed_patient(store: &ClinicStore, name: &str) -> Patient {
    let patient = Patient {
        id: Uuid::new_v4(),
        first_name: name.to_string(),
        last_name: "Pacient".to_string(),
        email: format!("{}@example.test", name.to_lowercase()),
    };
    let cloned = patient.clone();
    store
        .write(move |state| {
            state.patients.insert(cloned.id, cloned);
        })
        .await;
    patient
}

pub async fn seed_resource(store: &ClinicStore, name: &str, kind: ResourceType) -> Resource {
    let resource = Resource {
        id: Uuid::new_v4(),
        name: name.to_string(),
        resource_type: kind,
    };
    let cloned = resource.clone();
    store
        .write(move |state| {
            state.resources.insert(cloned.id, cloned);
        })
        .await;
    resource
}

/// A fixed instant used by tests that need a known "day": 2025-05-01 00:00 UTC.
pub fn test_day_start() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap()
}
