use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_models::appointment::Appointment;
use shared_models::care::{Condition, Prescription};
use shared_models::error::SchedulingError;
use shared_models::people::{Doctor, Patient};
use shared_models::resource::{Reservation, Resource, ResourceType};
use shared_models::time::windows_overlap;

use crate::locks::SchedulingLockTable;

/// All persisted clinic data. Only ever touched through `ClinicStore`,
/// whose write closure is the atomic commit boundary: a mutation either
/// applies all of its writes inside one closure or returns an error before
/// touching anything.
#[derive(Default)]
pub struct ClinicState {
    pub doctors: HashMap<Uuid, Doctor>,
    pub patients: HashMap<Uuid, Patient>,
    pub appointments: HashMap<Uuid, Appointment>,
    pub resources: HashMap<Uuid, Resource>,
    pub reservations: HashMap<Uuid, Reservation>,
    pub conditions: HashMap<Uuid, Condition>,
    pub prescriptions: HashMap<Uuid, Prescription>,
}

impl ClinicState {
    pub fn doctor(&self, id: Uuid) -> Result<&Doctor, SchedulingError> {
        self.doctors
            .get(&id)
            .ok_or_else(|| SchedulingError::not_found("doctor", id))
    }

    pub fn patient(&self, id: Uuid) -> Result<&Patient, SchedulingError> {
        self.patients
            .get(&id)
            .ok_or_else(|| SchedulingError::not_found("patient", id))
    }

    pub fn appointment(&self, id: Uuid) -> Result<&Appointment, SchedulingError> {
        self.appointments
            .get(&id)
            .ok_or_else(|| SchedulingError::not_found("appointment", id))
    }

    pub fn resource(&self, id: Uuid) -> Result<&Resource, SchedulingError> {
        self.resources
            .get(&id)
            .ok_or_else(|| SchedulingError::not_found("resource", id))
    }

    pub fn condition(&self, id: Uuid) -> Result<&Condition, SchedulingError> {
        self.conditions
            .get(&id)
            .ok_or_else(|| SchedulingError::not_found("condition", id))
    }

    pub fn prescription(&self, id: Uuid) -> Result<&Prescription, SchedulingError> {
        self.prescriptions
            .get(&id)
            .ok_or_else(|| SchedulingError::not_found("prescription", id))
    }

    /// Non-terminal appointments of a doctor intersecting `[start, end)`.
    /// This is the predicate behind the no-double-booking invariant.
    pub fn overlapping_doctor_appointments(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Vec<Appointment> {
        self.appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id && !a.is_terminal())
            .filter(|a| Some(a.id) != exclude)
            .filter(|a| windows_overlap(a.start_time, a.end_time, start, end))
            .cloned()
            .collect()
    }

    pub fn appointments_for_doctor_between(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let mut appts: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.doctor_id == doctor_id)
            .filter(|a| a.start_time >= from && a.start_time < to)
            .cloned()
            .collect();
        appts.sort_by_key(|a| a.start_time);
        appts
    }

    pub fn appointments_for_patient_between(
        &self,
        patient_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let mut appts: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .filter(|a| a.start_time >= from && a.start_time < to)
            .cloned()
            .collect();
        appts.sort_by_key(|a| a.start_time);
        appts
    }

    pub fn appointments_for_condition(&self, condition_id: Uuid) -> Vec<Appointment> {
        let mut appts: Vec<Appointment> = self
            .appointments
            .values()
            .filter(|a| a.condition_id == Some(condition_id))
            .cloned()
            .collect();
        appts.sort_by_key(|a| a.start_time);
        appts
    }

    /// Whether a resource unit has no active reservation intersecting
    /// `[start, end)`. `exclude_appointment` skips claims held by the
    /// appointment currently being re-validated.
    pub fn resource_is_free(
        &self,
        resource_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_appointment: Option<Uuid>,
    ) -> bool {
        !self
            .reservations
            .values()
            .filter(|r| r.active && r.resource_id == resource_id)
            .filter(|r| Some(r.appointment_id) != exclude_appointment)
            .any(|r| windows_overlap(r.start_time, r.end_time, start, end))
    }

    pub fn available_resources(
        &self,
        resource_type: ResourceType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Resource> {
        let mut free: Vec<Resource> = self
            .resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .filter(|r| self.resource_is_free(r.id, start, end, None))
            .cloned()
            .collect();
        free.sort_by(|a, b| a.name.cmp(&b.name));
        free
    }

    pub fn reservations_for_appointment(&self, appointment_id: Uuid) -> Vec<Reservation> {
        self.reservations
            .values()
            .filter(|r| r.appointment_id == appointment_id)
            .cloned()
            .collect()
    }

    /// Deactivate every reservation held by an appointment. Idempotent: an
    /// appointment with no active reservations releases nothing.
    pub fn release_reservations(&mut self, appointment_id: Uuid) -> usize {
        let mut released = 0;
        for reservation in self.reservations.values_mut() {
            if reservation.appointment_id == appointment_id && reservation.active {
                reservation.active = false;
                released += 1;
            }
        }
        if released > 0 {
            debug!(
                "released {} reservation(s) of appointment {}",
                released, appointment_id
            );
        }
        released
    }

    pub fn prescriptions_for_appointment(&self, appointment_id: Uuid) -> Vec<Prescription> {
        self.prescriptions
            .values()
            .filter(|p| p.appointment_id == Some(appointment_id))
            .cloned()
            .collect()
    }
}

/// Handle to the clinic state: snapshot reads behind a read lock, atomic
/// mutations behind the write lock, and the keyed lock table that
/// serializes check-then-write sections on contended calendar days and
/// resource units.
#[derive(Clone, Default)]
pub struct ClinicStore {
    inner: Arc<RwLock<ClinicState>>,
    locks: SchedulingLockTable,
}

impl ClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock-free snapshot read. May race with writers; callers that go on
    /// to write must re-validate under `write`.
    pub async fn read<R>(&self, f: impl FnOnce(&ClinicState) -> R) -> R {
        let state = self.inner.read().await;
        f(&state)
    }

    /// Atomic commit boundary. The closure validates first and only then
    /// applies its writes, so a returned error leaves no partial effects.
    pub async fn write<R>(&self, f: impl FnOnce(&mut ClinicState) -> R) -> R {
        let mut state = self.inner.write().await;
        f(&mut state)
    }

    pub fn locks(&self) -> &SchedulingLockTable {
        &self.locks
    }
}
