use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Immutable catalog entry. Availability is never a property of the entry
/// itself; it is derived from active reservations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub resource_type: ResourceType,
}

impl Resource {
    pub fn as_ref(&self) -> ResourceRef {
        ResourceRef {
            id: self.id,
            name: self.name.clone(),
            resource_type: self.resource_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Facility,
    Equipment,
    Medicine,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Facility,
        ResourceType::Equipment,
        ResourceType::Medicine,
    ];
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Facility => write!(f, "facility"),
            ResourceType::Equipment => write!(f, "equipment"),
            ResourceType::Medicine => write!(f, "medicine"),
        }
    }
}

/// Denormalised reference carried on an appointment, distinct from the
/// catalog `Resource` so catalog identity stays separate from occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRef {
    pub id: Uuid,
    pub name: String,
    pub resource_type: ResourceType,
}

/// A time-bound claim on one resource unit by one appointment. Released or
/// completed reservations stay in the store with `active = false`: inert
/// for availability, retained for history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub resource_type: ResourceType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub active: bool,
}
