use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The acting identity behind a mutating call. Every engine operation takes
/// one explicitly; there is no ambient "current user".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: ActorRole,
}

impl Actor {
    pub fn patient(id: Uuid) -> Self {
        Self {
            id,
            role: ActorRole::Patient,
        }
    }

    pub fn doctor(id: Uuid) -> Self {
        Self {
            id,
            role: ActorRole::Doctor,
        }
    }

    pub fn is_doctor(&self) -> bool {
        self.role == ActorRole::Doctor
    }

    pub fn is_patient(&self) -> bool {
        self.role == ActorRole::Patient
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Patient,
    Doctor,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorRole::Patient => write!(f, "patient"),
            ActorRole::Doctor => write!(f, "doctor"),
        }
    }
}

impl FromStr for ActorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patient" => Ok(ActorRole::Patient),
            "doctor" => Ok(ActorRole::Doctor),
            other => Err(format!("unknown actor role: {}", other)),
        }
    }
}
