// libs/patient-cell/src/services/registry.rs
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::error::SchedulingError;
use shared_models::people::Patient;
use shared_store::{AppState, ClinicStore};

use crate::models::CreatePatientRequest;

pub struct PatientRegistryService {
    store: ClinicStore,
}

impl PatientRegistryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
    ) -> Result<Patient, SchedulingError> {
        debug!("creating patient profile for {}", request.email);

        if request.first_name.trim().is_empty() {
            return Err(SchedulingError::validation(
                "firstName",
                "first name must not be empty",
            ));
        }
        if request.email.trim().is_empty() {
            return Err(SchedulingError::validation("email", "email must not be empty"));
        }

        let patient = Patient {
            id: Uuid::new_v4(),
            first_name: request.first_name,
            last_name: request.last_name,
            email: request.email,
        };

        let created = patient.clone();
        self.store
            .write(move |state| {
                state.patients.insert(created.id, created);
            })
            .await;

        info!("patient {} registered", patient.id);
        Ok(patient)
    }

    pub async fn list_patients(&self) -> Vec<Patient> {
        self.store
            .read(|state| {
                let mut patients: Vec<Patient> = state.patients.values().cloned().collect();
                patients.sort_by(|a, b| a.last_name.cmp(&b.last_name));
                patients
            })
            .await
    }

    pub async fn get_patient(&self, patient_id: Uuid) -> Result<Patient, SchedulingError> {
        self.store
            .read(move |state| state.patient(patient_id).cloned())
            .await
    }
}
