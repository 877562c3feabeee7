// libs/doctor-cell/src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shared_models::people::Specialization;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub specialization: Specialization,
}

#[derive(Debug, Deserialize)]
pub struct TimeslotsQuery {
    pub date: NaiveDate,
}
