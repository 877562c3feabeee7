// libs/resource-cell/src/services/inventory.rs
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::error::SchedulingError;
use shared_models::resource::{Reservation, Resource, ResourceType};
use shared_store::{AppState, ClinicState, ClinicStore};

use crate::models::{AvailableResourcesResponse, CreateResourceRequest};

/// Inventory of reservable resource units and their reservations. The
/// reserve/release entry points below operate on `&mut ClinicState` so the
/// scheduling engine can claim resources inside the same atomic write as
/// the appointment mutation they belong to.
pub struct InventoryService {
    store: ClinicStore,
}

impl InventoryService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    pub async fn create_resource(
        &self,
        request: CreateResourceRequest,
    ) -> Result<Resource, SchedulingError> {
        if request.name.trim().is_empty() {
            return Err(SchedulingError::validation("name", "name must not be empty"));
        }

        let resource = Resource {
            id: Uuid::new_v4(),
            name: request.name,
            resource_type: request.resource_type,
        };

        let created = resource.clone();
        self.store
            .write(move |state| {
                state.resources.insert(created.id, created);
            })
            .await;

        info!(
            "resource {} ({}) added to inventory",
            resource.id, resource.resource_type
        );
        Ok(resource)
    }

    pub async fn list_resources(&self) -> Vec<Resource> {
        self.store
            .read(|state| {
                let mut resources: Vec<Resource> = state.resources.values().cloned().collect();
                resources.sort_by(|a, b| a.name.cmp(&b.name));
                resources
            })
            .await
    }

    pub async fn get_resource(&self, resource_id: Uuid) -> Result<Resource, SchedulingError> {
        self.store
            .read(move |state| state.resource(resource_id).cloned())
            .await
    }

    /// Free units of one kind over `[start, end)`.
    pub async fn list_available(
        &self,
        resource_type: ResourceType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Resource>, SchedulingError> {
        if end <= start {
            return Err(SchedulingError::validation(
                "durationMinutes",
                "availability window must have positive length",
            ));
        }
        Ok(self
            .store
            .read(move |state| state.available_resources(resource_type, start, end))
            .await)
    }

    /// Free units of every kind over `[start, end)`, grouped for display
    /// next to an appointment acceptance form.
    pub async fn grouped_available(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<AvailableResourcesResponse, SchedulingError> {
        if end <= start {
            return Err(SchedulingError::validation(
                "durationMinutes",
                "availability window must have positive length",
            ));
        }
        Ok(self
            .store
            .read(move |state| AvailableResourcesResponse {
                facilities: state.available_resources(ResourceType::Facility, start, end),
                equipment: state.available_resources(ResourceType::Equipment, start, end),
                medicine: state.available_resources(ResourceType::Medicine, start, end),
            })
            .await)
    }

    pub async fn reservations_for_appointment(&self, appointment_id: Uuid) -> Vec<Reservation> {
        self.store
            .read(move |state| state.reservations_for_appointment(appointment_id))
            .await
    }
}

/// Claim one resource unit for an appointment window. Fails with
/// `ResourceConflict` when another appointment holds an active overlapping
/// reservation. Runs inside the caller's write closure, so the claim
/// commits together with the appointment it serves.
pub fn reserve_in(
    state: &mut ClinicState,
    appointment_id: Uuid,
    resource_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Reservation, SchedulingError> {
    let resource = state.resource(resource_id)?.clone();

    if !state.resource_is_free(resource_id, start, end, Some(appointment_id)) {
        return Err(SchedulingError::ResourceConflict { resource_id });
    }

    let reservation = Reservation {
        id: Uuid::new_v4(),
        appointment_id,
        resource_id,
        resource_name: resource.name,
        resource_type: resource.resource_type,
        start_time: start,
        end_time: end,
        active: true,
    };
    state.reservations.insert(reservation.id, reservation.clone());

    debug!(
        "reserved {} {} for appointment {}",
        reservation.resource_type, resource_id, appointment_id
    );
    Ok(reservation)
}

/// Drop every active claim of an appointment. Reservations are kept as
/// inactive history rather than deleted. Idempotent.
pub fn release_in(state: &mut ClinicState, appointment_id: Uuid) -> usize {
    state.release_reservations(appointment_id)
}
