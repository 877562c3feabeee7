// libs/care-cell/src/services/prescriptions.rs
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use shared_models::actor::Actor;
use shared_models::appointment::AppointmentStatus;
use shared_models::care::Prescription;
use shared_models::error::SchedulingError;
use shared_store::{AppState, ClinicState, ClinicStore};

use crate::models::{CreatePrescriptionRequest, UpdatePrescriptionRequest};

/// Prescriptions are issued by doctors, optionally against an appointment.
/// A linked appointment must be one the prescribing doctor holds, and must
/// already be a confirmed booking or a finished visit.
pub struct PrescriptionService {
    store: ClinicStore,
}

impl PrescriptionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn create_prescription(
        &self,
        actor: Actor,
        request: CreatePrescriptionRequest,
    ) -> Result<Prescription, SchedulingError> {
        if !actor.is_doctor() {
            return Err(SchedulingError::forbidden("only doctors issue prescriptions"));
        }
        if request.name.trim().is_empty() {
            return Err(SchedulingError::validation("name", "name must not be empty"));
        }
        validate_span(request.start_date, request.end_date)?;

        let prescription = Prescription {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            appointment_id: request.appointment_id,
            name: request.name,
            start_date: request.start_date,
            end_date: request.end_date,
            doctors_note: request.doctors_note,
        };

        let created = prescription.clone();
        self.store
            .write(move |state| {
                state.patient(created.patient_id)?;
                guard_linked_appointment(state, actor, &created)?;
                state.prescriptions.insert(created.id, created);
                Ok(())
            })
            .await?;

        info!(
            "prescription {} issued for patient {}",
            prescription.id, prescription.patient_id
        );
        Ok(prescription)
    }

    pub async fn update_prescription(
        &self,
        actor: Actor,
        prescription_id: Uuid,
        request: UpdatePrescriptionRequest,
    ) -> Result<Prescription, SchedulingError> {
        if !actor.is_doctor() {
            return Err(SchedulingError::forbidden("only doctors manage prescriptions"));
        }

        self.store
            .write(move |state| {
                let current = state.prescription(prescription_id)?.clone();
                guard_linked_appointment(state, actor, &current)?;

                let start = request.start_date.unwrap_or(current.start_date);
                let end = request.end_date.unwrap_or(current.end_date);
                validate_span(start, end)?;
                if let Some(name) = &request.name {
                    if name.trim().is_empty() {
                        return Err(SchedulingError::validation("name", "name must not be empty"));
                    }
                }

                let stored = state.prescriptions.get_mut(&prescription_id).ok_or_else(|| {
                    SchedulingError::not_found("prescription", prescription_id)
                })?;
                if let Some(name) = request.name {
                    stored.name = name;
                }
                stored.start_date = start;
                stored.end_date = end;
                if let Some(note) = request.doctors_note {
                    stored.doctors_note = Some(note);
                }
                Ok(stored.clone())
            })
            .await
    }

    pub async fn delete_prescription(
        &self,
        actor: Actor,
        prescription_id: Uuid,
    ) -> Result<(), SchedulingError> {
        if !actor.is_doctor() {
            return Err(SchedulingError::forbidden("only doctors manage prescriptions"));
        }

        self.store
            .write(move |state| {
                let current = state.prescription(prescription_id)?.clone();
                guard_linked_appointment(state, actor, &current)?;
                state.prescriptions.remove(&prescription_id);
                Ok(())
            })
            .await
    }

    pub async fn patient_prescriptions(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Prescription>, SchedulingError> {
        self.store
            .read(move |state| {
                state.patient(patient_id)?;
                let mut prescriptions: Vec<Prescription> = state
                    .prescriptions
                    .values()
                    .filter(|p| p.patient_id == patient_id)
                    .cloned()
                    .collect();
                prescriptions.sort_by_key(|p| p.start_date);
                Ok(prescriptions)
            })
            .await
    }

    pub async fn appointment_prescriptions(
        &self,
        appointment_id: Uuid,
    ) -> Result<Vec<Prescription>, SchedulingError> {
        self.store
            .read(move |state| {
                state.appointment(appointment_id)?;
                Ok(state.prescriptions_for_appointment(appointment_id))
            })
            .await
    }
}

/// A prescription linked to an appointment belongs to that appointment's
/// doctor, and the appointment must be a confirmed booking or a finished
/// visit. Applies to create, update and delete alike.
fn guard_linked_appointment(
    state: &ClinicState,
    actor: Actor,
    prescription: &Prescription,
) -> Result<(), SchedulingError> {
    let Some(appointment_id) = prescription.appointment_id else {
        return Ok(());
    };
    let appointment = state.appointment(appointment_id)?;
    if appointment.doctor_id != actor.id {
        return Err(SchedulingError::forbidden(
            "prescriptions may only reference the prescriber's own appointments",
        ));
    }
    if appointment.patient_id != prescription.patient_id {
        return Err(SchedulingError::validation(
            "appointmentId",
            "appointment belongs to a different patient",
        ));
    }
    if !matches!(
        appointment.status,
        AppointmentStatus::Scheduled | AppointmentStatus::Completed
    ) {
        return Err(SchedulingError::validation(
            "appointmentId",
            format!(
                "cannot prescribe against a {} appointment",
                appointment.status
            ),
        ));
    }
    Ok(())
}

fn validate_span(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), SchedulingError> {
    if end <= start {
        return Err(SchedulingError::validation(
            "endDate",
            "prescription must end after it starts",
        ));
    }
    Ok(())
}
