// libs/doctor-cell/src/services/directory.rs
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::error::SchedulingError;
use shared_models::people::Doctor;
use shared_store::{AppState, ClinicStore};

use crate::models::CreateDoctorRequest;

/// Doctor registry. Entries are immutable once created; there is no update
/// or delete surface.
pub struct DoctorDirectoryService {
    store: ClinicStore,
}

impl DoctorDirectoryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
    ) -> Result<Doctor, SchedulingError> {
        debug!("creating doctor profile for {}", request.email);

        if request.first_name.trim().is_empty() {
            return Err(SchedulingError::validation(
                "firstName",
                "first name must not be empty",
            ));
        }
        if request.email.trim().is_empty() {
            return Err(SchedulingError::validation("email", "email must not be empty"));
        }

        let doctor = Doctor {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
            specialization: request.specialization,
        };

        let created = doctor.clone();
        self.store
            .write(move |state| {
                state.doctors.insert(created.id, created);
            })
            .await;

        info!(
            "doctor {} registered with specialization {}",
            doctor.id, doctor.specialization
        );
        Ok(doctor)
    }

    pub async fn list_doctors(&self) -> Vec<Doctor> {
        self.store
            .read(|state| {
                let mut doctors: Vec<Doctor> = state.doctors.values().cloned().collect();
                doctors.sort_by(|a, b| a.last_name.cmp(&b.last_name));
                doctors
            })
            .await
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, SchedulingError> {
        self.store
            .read(move |state| state.doctor(doctor_id).cloned())
            .await
    }
}
