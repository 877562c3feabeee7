// libs/care-cell/src/services/conditions.rs
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::actor::Actor;
use shared_models::care::Condition;
use shared_models::error::SchedulingError;
use shared_store::{AppState, ClinicStore};

use chrono::Utc;

use crate::models::{ConditionDetail, CreateConditionRequest};

/// Patient conditions. A condition links related appointments together;
/// ending one never touches the appointments already booked against it.
pub struct ConditionService {
    store: ClinicStore,
}

impl ConditionService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
        }
    }

    /// Patients register conditions for themselves; doctors for anyone.
    pub async fn register_condition(
        &self,
        actor: Actor,
        request: CreateConditionRequest,
    ) -> Result<Condition, SchedulingError> {
        if request.name.trim().is_empty() {
            return Err(SchedulingError::validation("name", "name must not be empty"));
        }
        if actor.is_patient() && actor.id != request.patient_id {
            return Err(SchedulingError::forbidden(
                "a patient may only register their own conditions",
            ));
        }
        if let Some(end_date) = request.end_date {
            if end_date < request.start_date {
                return Err(SchedulingError::validation(
                    "endDate",
                    "condition cannot end before it started",
                ));
            }
        }

        let condition = Condition {
            id: Uuid::new_v4(),
            patient_id: request.patient_id,
            name: request.name,
            start_date: request.start_date,
            end_date: request.end_date,
        };

        let created = condition.clone();
        self.store
            .write(move |state| {
                state.patient(created.patient_id)?;
                state.conditions.insert(created.id, created);
                Ok(())
            })
            .await?;

        info!(
            "condition {} registered for patient {}",
            condition.id, condition.patient_id
        );
        Ok(condition)
    }

    /// Flip a condition between ongoing and ended. Ending stamps the
    /// current instant as the end date; toggling again clears it, e.g.
    /// after a relapse.
    pub async fn toggle_condition(
        &self,
        actor: Actor,
        condition_id: Uuid,
    ) -> Result<Condition, SchedulingError> {
        self.store
            .write(move |state| {
                let condition = state.condition(condition_id)?.clone();
                authorize_condition(actor, &condition)?;

                let stored = state.conditions.get_mut(&condition_id).ok_or_else(|| {
                    SchedulingError::not_found("condition", condition_id)
                })?;
                stored.end_date = if stored.end_date.is_some() {
                    debug!("condition {} reopened", condition_id);
                    None
                } else {
                    debug!("condition {} ended", condition_id);
                    Some(Utc::now())
                };
                Ok(stored.clone())
            })
            .await
    }

    pub async fn condition_detail(
        &self,
        condition_id: Uuid,
    ) -> Result<ConditionDetail, SchedulingError> {
        self.store
            .read(move |state| {
                let condition = state.condition(condition_id)?.clone();
                let appointments = state.appointments_for_condition(condition_id);
                Ok(ConditionDetail {
                    condition,
                    appointments,
                })
            })
            .await
    }

    pub async fn patient_conditions(
        &self,
        patient_id: Uuid,
    ) -> Result<Vec<Condition>, SchedulingError> {
        self.store
            .read(move |state| {
                state.patient(patient_id)?;
                let mut conditions: Vec<Condition> = state
                    .conditions
                    .values()
                    .filter(|c| c.patient_id == patient_id)
                    .cloned()
                    .collect();
                conditions.sort_by_key(|c| c.start_date);
                Ok(conditions)
            })
            .await
    }
}

fn authorize_condition(actor: Actor, condition: &Condition) -> Result<(), SchedulingError> {
    if actor.is_patient() && actor.id != condition.patient_id {
        return Err(SchedulingError::forbidden(
            "a patient may only manage their own conditions",
        ));
    }
    Ok(())
}
