// libs/appointment-cell/src/services/engine.rs
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::services::AvailabilityService;
use resource_cell::services::inventory::{release_in, reserve_in};
use shared_models::actor::Actor;
use shared_models::appointment::{
    Appointment, AppointmentEvent, AppointmentStatus, CanceledBy,
};
use shared_models::error::SchedulingError;
use shared_models::resource::ResourceRef;
use shared_store::locks::{doctor_day_key, resource_key};
use shared_store::{AppState, ClinicState, ClinicStore};

use crate::models::{
    AcceptAppointmentRequest, AppointmentDetail, AppointmentDisplay, CancelAppointmentRequest,
    DenyAppointmentRequest, RescheduleAppointmentRequest, ResourceSelection,
    ScheduleAppointmentRequest, SetResourcesRequest,
};
use crate::services::lifecycle::AppointmentLifecycle;

/// The scheduling engine: every appointment mutation goes through here.
/// Each operation takes the lock keys its check-then-write section depends
/// on (the doctor days a window touches, plus any resource units), retries
/// acquisition a bounded number of times, re-validates under the lock
/// inside one atomic write, and releases the keys afterwards.
pub struct SchedulingEngine {
    store: ClinicStore,
    direct_booking: bool,
    max_lock_attempts: u32,
    lock_ttl: Duration,
}

impl SchedulingEngine {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            direct_booking: state.config.direct_booking,
            max_lock_attempts: state.config.max_lock_attempts,
            lock_ttl: Duration::from_secs(state.config.lock_ttl_seconds),
        }
    }

    pub async fn schedule(
        &self,
        actor: Actor,
        request: ScheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let now = Utc::now();
        if request.start_time <= now {
            return Err(SchedulingError::validation(
                "startTime",
                "appointment must start in the future",
            ));
        }

        let start = request.start_time;
        let end = start + request.appointment_type.duration();
        AvailabilityService::validate_window(start, end)?;

        // Who books decides the entry status: a patient files a request, a
        // doctor books straight into their own calendar when direct booking
        // is on.
        let status = if actor.is_patient() {
            if actor.id != request.patient_id {
                return Err(SchedulingError::forbidden(
                    "a patient may only book appointments for themselves",
                ));
            }
            AppointmentStatus::Requested
        } else {
            if actor.id != request.doctor_id {
                return Err(SchedulingError::forbidden(
                    "a doctor may only book into their own calendar",
                ));
            }
            if self.direct_booking {
                AppointmentStatus::Scheduled
            } else {
                AppointmentStatus::Requested
            }
        };

        let keys = window_day_keys(request.doctor_id, start, end);
        self.acquire_keys(&keys).await?;

        let result = self
            .store
            .write(move |state| {
                state.patient(request.patient_id)?;
                state.doctor(request.doctor_id)?;
                if let Some(condition_id) = request.condition_id {
                    let condition = state.condition(condition_id)?;
                    if condition.patient_id != request.patient_id {
                        return Err(SchedulingError::validation(
                            "conditionId",
                            "condition belongs to a different patient",
                        ));
                    }
                }

                if !AvailabilityService::window_is_free_in(
                    state,
                    request.doctor_id,
                    start,
                    end,
                    None,
                ) {
                    return Err(SchedulingError::SlotUnavailable {
                        doctor_id: request.doctor_id,
                        start,
                        end,
                    });
                }

                let appointment = Appointment {
                    id: Uuid::new_v4(),
                    patient_id: request.patient_id,
                    doctor_id: request.doctor_id,
                    start_time: start,
                    end_time: end,
                    appointment_type: request.appointment_type,
                    status,
                    reason: request.reason,
                    condition_id: request.condition_id,
                    cancellation_reason: None,
                    canceled_by: None,
                    denial_reason: None,
                    resources: Vec::new(),
                    created_at: now,
                    updated_at: now,
                };
                state.appointments.insert(appointment.id, appointment.clone());
                Ok(appointment)
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            info!(
                "appointment {} booked as {} for doctor {} at {}",
                appointment.id, appointment.status, appointment.doctor_id, appointment.start_time
            );
        }
        result
    }

    /// Accept a requested appointment, optionally claiming resources for
    /// its window in the same commit.
    pub async fn accept(
        &self,
        actor: Actor,
        appointment_id: Uuid,
        request: AcceptAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        let snapshot = self.snapshot(appointment_id).await?;

        let mut keys = window_day_keys(snapshot.doctor_id, snapshot.start_time, snapshot.end_time);
        keys.extend(request.resources.ids().into_iter().map(resource_key));
        self.acquire_keys(&keys).await?;

        let selection = request.resources;
        let result = self
            .store
            .write(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                AppointmentLifecycle::authorize(actor, AppointmentEvent::Accept, &appointment)?;
                let target =
                    AppointmentLifecycle::ensure_transition(appointment.status, AppointmentEvent::Accept)?;

                // The request itself holds the window, so only another
                // booking that slipped past it could collide here.
                if !AvailabilityService::window_is_free_in(
                    state,
                    appointment.doctor_id,
                    appointment.start_time,
                    appointment.end_time,
                    Some(appointment_id),
                ) {
                    return Err(SchedulingError::SlotUnavailable {
                        doctor_id: appointment.doctor_id,
                        start: appointment.start_time,
                        end: appointment.end_time,
                    });
                }

                // No selection keeps whatever was lined up while the
                // appointment was pending.
                let refs = if selection.is_empty() {
                    appointment.resources.clone()
                } else {
                    swap_selection(
                        state,
                        appointment_id,
                        &selection,
                        appointment.start_time,
                        appointment.end_time,
                    )?
                };

                let stored = state.appointments.get_mut(&appointment_id).ok_or_else(|| {
                    SchedulingError::not_found("appointment", appointment_id)
                })?;
                stored.status = target;
                stored.resources = refs;
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            info!("appointment {} accepted by doctor {}", appointment.id, actor.id);
        }
        result
    }

    /// Deny a requested appointment. The reason is mandatory and stored on
    /// the entity.
    pub async fn deny(
        &self,
        actor: Actor,
        appointment_id: Uuid,
        request: DenyAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        if request.reason.trim().is_empty() {
            return Err(SchedulingError::validation("reason", "a denial reason is required"));
        }

        let snapshot = self.snapshot(appointment_id).await?;
        let keys = window_day_keys(snapshot.doctor_id, snapshot.start_time, snapshot.end_time);
        self.acquire_keys(&keys).await?;

        let result = self
            .store
            .write(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                AppointmentLifecycle::authorize(actor, AppointmentEvent::Deny, &appointment)?;
                let target =
                    AppointmentLifecycle::ensure_transition(appointment.status, AppointmentEvent::Deny)?;

                release_in(state, appointment_id);
                let stored = state.appointments.get_mut(&appointment_id).ok_or_else(|| {
                    SchedulingError::not_found("appointment", appointment_id)
                })?;
                stored.status = target;
                stored.denial_reason = Some(request.reason);
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            info!("appointment {} denied by doctor {}", appointment.id, actor.id);
        }
        result
    }

    /// Cancel an appointment, freeing its calendar window and dropping its
    /// resource claims.
    pub async fn cancel(
        &self,
        actor: Actor,
        appointment_id: Uuid,
        request: CancelAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        if request.reason.trim().is_empty() {
            return Err(SchedulingError::validation(
                "reason",
                "a cancellation reason is required",
            ));
        }

        let snapshot = self.snapshot(appointment_id).await?;
        let keys = window_day_keys(snapshot.doctor_id, snapshot.start_time, snapshot.end_time);
        self.acquire_keys(&keys).await?;

        let canceled_by = if actor.is_doctor() {
            CanceledBy::Doctor
        } else {
            CanceledBy::Patient
        };
        let result = self
            .store
            .write(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                AppointmentLifecycle::authorize(actor, AppointmentEvent::Cancel, &appointment)?;
                let target =
                    AppointmentLifecycle::ensure_transition(appointment.status, AppointmentEvent::Cancel)?;

                release_in(state, appointment_id);
                let stored = state.appointments.get_mut(&appointment_id).ok_or_else(|| {
                    SchedulingError::not_found("appointment", appointment_id)
                })?;
                stored.status = target;
                stored.cancellation_reason = Some(request.reason);
                stored.canceled_by = Some(canceled_by);
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            info!(
                "appointment {} cancelled by {} {}",
                appointment.id, actor.role, actor.id
            );
        }
        result
    }

    /// Move a held appointment to a new window, optionally to another
    /// doctor. The move voids the doctor's acceptance: the appointment goes
    /// back to `requested`, its reservations are released, and resources
    /// must be selected again on the next accept.
    pub async fn reschedule(
        &self,
        actor: Actor,
        appointment_id: Uuid,
        request: RescheduleAppointmentRequest,
    ) -> Result<Appointment, SchedulingError> {
        if request.new_start_time <= Utc::now() {
            return Err(SchedulingError::validation(
                "newStartTime",
                "appointment must start in the future",
            ));
        }

        let snapshot = self.snapshot(appointment_id).await?;
        let new_doctor_id = request.new_doctor_id.unwrap_or(snapshot.doctor_id);
        let new_start = request.new_start_time;
        let new_end = new_start + snapshot.appointment_type.duration();

        // Both calendars are touched: the vacated window and the target one.
        let mut keys = window_day_keys(snapshot.doctor_id, snapshot.start_time, snapshot.end_time);
        keys.extend(window_day_keys(new_doctor_id, new_start, new_end));
        keys.sort();
        keys.dedup();
        self.acquire_keys(&keys).await?;

        let result = self
            .store
            .write(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                AppointmentLifecycle::authorize(actor, AppointmentEvent::Reschedule, &appointment)?;
                let target = AppointmentLifecycle::ensure_transition(
                    appointment.status,
                    AppointmentEvent::Reschedule,
                )?;

                state.doctor(new_doctor_id)?;
                if !AvailabilityService::window_is_free_in(
                    state,
                    new_doctor_id,
                    new_start,
                    new_end,
                    Some(appointment_id),
                ) {
                    return Err(SchedulingError::SlotUnavailable {
                        doctor_id: new_doctor_id,
                        start: new_start,
                        end: new_end,
                    });
                }

                release_in(state, appointment_id);
                let stored = state.appointments.get_mut(&appointment_id).ok_or_else(|| {
                    SchedulingError::not_found("appointment", appointment_id)
                })?;
                stored.doctor_id = new_doctor_id;
                stored.start_time = new_start;
                stored.end_time = new_end;
                stored.status = target;
                stored.resources = Vec::new();
                if let Some(reason) = request.reason {
                    stored.reason = Some(reason);
                }
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            info!(
                "appointment {} rescheduled to {} with doctor {}",
                appointment.id, appointment.start_time, appointment.doctor_id
            );
        }
        result
    }

    /// Close out a held appointment once its start time has passed. Its
    /// reservations become inactive history in the same commit.
    pub async fn complete(
        &self,
        actor: Actor,
        appointment_id: Uuid,
    ) -> Result<Appointment, SchedulingError> {
        let now = Utc::now();
        let snapshot = self.snapshot(appointment_id).await?;
        let keys = window_day_keys(snapshot.doctor_id, snapshot.start_time, snapshot.end_time);
        self.acquire_keys(&keys).await?;

        let result = self
            .store
            .write(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                AppointmentLifecycle::authorize(actor, AppointmentEvent::Complete, &appointment)?;
                let target = AppointmentLifecycle::ensure_transition(
                    appointment.status,
                    AppointmentEvent::Complete,
                )?;
                if appointment.start_time > now {
                    return Err(SchedulingError::validation(
                        "startTime",
                        "an appointment cannot be completed before it starts",
                    ));
                }

                release_in(state, appointment_id);
                let stored = state.appointments.get_mut(&appointment_id).ok_or_else(|| {
                    SchedulingError::not_found("appointment", appointment_id)
                })?;
                stored.status = target;
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            info!("appointment {} completed", appointment.id);
        }
        result
    }

    /// Replace the resource set of a pending or held appointment: old
    /// claims are released and the new selection claimed in one commit. An
    /// empty selection drops every claim.
    pub async fn set_resources(
        &self,
        actor: Actor,
        appointment_id: Uuid,
        request: SetResourcesRequest,
    ) -> Result<Appointment, SchedulingError> {
        let snapshot = self.snapshot(appointment_id).await?;

        let mut keys = window_day_keys(snapshot.doctor_id, snapshot.start_time, snapshot.end_time);
        keys.extend(request.resources.ids().into_iter().map(resource_key));
        self.acquire_keys(&keys).await?;

        let selection = request.resources;
        let result = self
            .store
            .write(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                AppointmentLifecycle::authorize(actor, AppointmentEvent::SetResources, &appointment)?;
                AppointmentLifecycle::ensure_transition(
                    appointment.status,
                    AppointmentEvent::SetResources,
                )?;

                let refs = swap_selection(
                    state,
                    appointment_id,
                    &selection,
                    appointment.start_time,
                    appointment.end_time,
                )?;

                let stored = state.appointments.get_mut(&appointment_id).ok_or_else(|| {
                    SchedulingError::not_found("appointment", appointment_id)
                })?;
                stored.resources = refs;
                stored.updated_at = Utc::now();
                Ok(stored.clone())
            })
            .await;
        self.store.locks().release_all(&keys).await;

        if let Ok(appointment) = &result {
            debug!(
                "appointment {} now holds {} resource(s)",
                appointment.id,
                appointment.resources.len()
            );
        }
        result
    }

    pub async fn detail(&self, appointment_id: Uuid) -> Result<AppointmentDetail, SchedulingError> {
        self.store
            .read(move |state| {
                let appointment = state.appointment(appointment_id)?.clone();
                let doctor = state.doctor(appointment.doctor_id)?.clone();
                let patient = state.patient(appointment.patient_id)?.clone();
                let condition = match appointment.condition_id {
                    Some(condition_id) => Some(state.condition(condition_id)?.clone()),
                    None => None,
                };
                let reservations = state.reservations_for_appointment(appointment_id);
                let prescriptions = state.prescriptions_for_appointment(appointment_id);
                let available_events = AppointmentLifecycle::valid_events(appointment.status);
                Ok(AppointmentDetail {
                    appointment,
                    doctor,
                    patient,
                    condition,
                    reservations,
                    prescriptions,
                    available_events,
                })
            })
            .await
    }

    pub async fn patient_calendar(
        &self,
        patient_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AppointmentDisplay>, SchedulingError> {
        validate_range(from, to)?;
        self.store
            .read(move |state| {
                state.patient(patient_id)?;
                Ok(state
                    .appointments_for_patient_between(patient_id, from, to)
                    .iter()
                    .map(|appointment| display_row(state, appointment))
                    .collect())
            })
            .await
    }

    pub async fn doctor_calendar(
        &self,
        doctor_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AppointmentDisplay>, SchedulingError> {
        validate_range(from, to)?;
        self.store
            .read(move |state| {
                state.doctor(doctor_id)?;
                Ok(state
                    .appointments_for_doctor_between(doctor_id, from, to)
                    .iter()
                    .map(|appointment| display_row(state, appointment))
                    .collect())
            })
            .await
    }

    async fn snapshot(&self, appointment_id: Uuid) -> Result<Appointment, SchedulingError> {
        self.store
            .read(move |state| state.appointment(appointment_id).cloned())
            .await
    }

    /// Bounded lock acquisition with backoff. Surfaces `Contention` once
    /// the attempts are exhausted.
    async fn acquire_keys(&self, keys: &[String]) -> Result<(), SchedulingError> {
        for attempt in 1..=self.max_lock_attempts {
            if self.store.locks().try_acquire_all(keys, self.lock_ttl).await {
                debug!("acquired {} scheduling key(s) on attempt {}", keys.len(), attempt);
                return Ok(());
            }
            if attempt < self.max_lock_attempts {
                warn!(
                    "scheduling keys contended, retrying attempt {}/{}",
                    attempt + 1,
                    self.max_lock_attempts
                );
                tokio::time::sleep(Duration::from_millis(50 * attempt as u64)).await;
            }
        }
        Err(SchedulingError::Contention {
            message: format!(
                "could not acquire scheduling keys after {} attempts",
                self.max_lock_attempts
            ),
        })
    }
}

/// Calendar row with the counterpart names resolved from the registries.
fn display_row(state: &ClinicState, appointment: &Appointment) -> AppointmentDisplay {
    let doctor_name = state
        .doctor(appointment.doctor_id)
        .map(|d| d.full_name())
        .unwrap_or_default();
    let patient_name = state
        .patient(appointment.patient_id)
        .map(|p| p.full_name())
        .unwrap_or_default();
    AppointmentDisplay::new(appointment, doctor_name, patient_name)
}

/// Swap the appointment's resource claims for a new selection. Every unit
/// is checked before the old claims are dropped or any reservation is
/// written, so a conflicting unit leaves the appointment's existing
/// reservations untouched.
fn swap_selection(
    state: &mut ClinicState,
    appointment_id: Uuid,
    selection: &ResourceSelection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<ResourceRef>, SchedulingError> {
    let ids = selection.ids();
    for resource_id in &ids {
        state.resource(*resource_id)?;
        if !state.resource_is_free(*resource_id, start, end, Some(appointment_id)) {
            return Err(SchedulingError::ResourceConflict {
                resource_id: *resource_id,
            });
        }
    }

    release_in(state, appointment_id);
    let mut refs = Vec::with_capacity(ids.len());
    for resource_id in ids {
        let reservation = reserve_in(state, appointment_id, resource_id, start, end)?;
        refs.push(ResourceRef {
            id: reservation.resource_id,
            name: reservation.resource_name.clone(),
            resource_type: reservation.resource_type,
        });
    }
    Ok(refs)
}

/// The day keys a doctor-calendar window must hold. Windows are short, so
/// at most the start and end dates are touched.
fn window_day_keys(doctor_id: Uuid, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<String> {
    let mut keys = vec![doctor_day_key(doctor_id, start.date_naive())];
    let last = doctor_day_key(doctor_id, end.date_naive());
    if !keys.contains(&last) {
        keys.push(last);
    }
    keys
}

fn validate_range(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<(), SchedulingError> {
    if to <= from {
        return Err(SchedulingError::validation(
            "to",
            "listing window must end after it starts",
        ));
    }
    Ok(())
}
