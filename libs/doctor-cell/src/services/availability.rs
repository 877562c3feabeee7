// libs/doctor-cell/src/services/availability.rs
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use tracing::debug;
use uuid::Uuid;

use shared_models::error::SchedulingError;
use shared_models::people::{SlotStatus, TimeSlot};
use shared_store::{AppState, ClinicState, ClinicStore};

/// The Time-Slot Model: answers "what times can this doctor be booked on
/// this date" and "is this window free". The grid is advisory; the window
/// predicate is authoritative and shared with the engine's commit-time
/// re-validation.
pub struct AvailabilityService {
    store: ClinicStore,
    open_hour: u32,
    close_hour: u32,
    slot_minutes: u32,
    offset: FixedOffset,
}

impl AvailabilityService {
    pub fn new(state: &AppState) -> Self {
        Self {
            store: state.store.clone(),
            open_hour: state.config.open_hour,
            close_hour: state.config.close_hour,
            slot_minutes: state.config.slot_minutes,
            offset: state.config.clinic_offset(),
        }
    }

    /// Reject zero-length and inverted windows before any availability math.
    pub fn validate_window(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), SchedulingError> {
        if end <= start {
            return Err(SchedulingError::validation(
                "endTime",
                format!("window end {} must be after start {}", end, start),
            ));
        }
        Ok(())
    }

    /// State-level window predicate, usable inside the engine's atomic
    /// write closure. True iff no non-terminal appointment of the doctor
    /// overlaps `[start, end)`.
    pub fn window_is_free_in(
        state: &ClinicState,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> bool {
        state
            .overlapping_doctor_appointments(doctor_id, start, end, exclude)
            .is_empty()
    }

    /// Snapshot check for callers outside the engine. May be stale by the
    /// time a write is attempted; writes re-validate under their locks.
    pub async fn is_window_free(
        &self,
        doctor_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> Result<bool, SchedulingError> {
        Self::validate_window(start, end)?;
        self.store
            .read(|state| {
                state.doctor(doctor_id)?;
                Ok(Self::window_is_free_in(state, doctor_id, start, end, exclude))
            })
            .await
    }

    /// Build the doctor's advisory grid for a calendar date, interpreted in
    /// the clinic timezone. Slots intersecting a non-terminal appointment
    /// or lying in the past are unavailable.
    pub async fn list_slots(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        self.list_slots_at(doctor_id, date, Utc::now()).await
    }

    /// `list_slots` with an explicit "now", so tests can pin time.
    pub async fn list_slots_at(
        &self,
        doctor_id: Uuid,
        date: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<TimeSlot>, SchedulingError> {
        debug!("building slot grid for doctor {} on {}", doctor_id, date);

        let close_minute = self.close_hour * 60;
        let mut slots = Vec::new();

        let grid: Vec<(DateTime<Utc>, DateTime<Utc>)> = {
            let mut windows = Vec::new();
            let mut minute = self.open_hour * 60;
            while minute < close_minute {
                let end_minute = (minute + self.slot_minutes).min(close_minute);
                let (Some(start), Some(end)) = (
                    self.local_instant(date, minute),
                    self.local_instant(date, end_minute),
                ) else {
                    minute = end_minute;
                    continue;
                };
                windows.push((start, end));
                minute = end_minute;
            }
            windows
        };

        self.store
            .read(|state| {
                state.doctor(doctor_id)?;
                for (start, end) in grid {
                    let booked = !Self::window_is_free_in(state, doctor_id, start, end, None);
                    let past = start < now;
                    slots.push(TimeSlot {
                        doctor_id,
                        date,
                        start_time: start,
                        end_time: end,
                        status: if booked || past {
                            SlotStatus::Unavailable
                        } else {
                            SlotStatus::Available
                        },
                    });
                }
                Ok(())
            })
            .await?;

        Ok(slots)
    }

    fn local_instant(&self, date: NaiveDate, minute_of_day: u32) -> Option<DateTime<Utc>> {
        let naive = date
            .and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::minutes(minute_of_day as i64))?;
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
