use chrono::{FixedOffset, Offset, Utc};
use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// First bookable hour of the clinic day, in the clinic timezone.
    pub open_hour: u32,
    /// Hour at which the clinic day ends (exclusive), in the clinic timezone.
    pub close_hour: u32,
    /// Granularity of the advisory slot grid.
    pub slot_minutes: u32,
    /// Clinic timezone as a fixed offset from UTC, in minutes.
    pub clinic_utc_offset_minutes: i32,
    /// When enabled, a doctor-created appointment is booked straight into
    /// `scheduled` instead of `requested`.
    pub direct_booking: bool,
    /// Bounded retries for keyed scheduling locks before surfacing contention.
    pub max_lock_attempts: u32,
    pub lock_ttl_seconds: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: parse_var("CLINIC_PORT", 3000),
            open_hour: parse_var("CLINIC_OPEN_HOUR", 8),
            close_hour: parse_var("CLINIC_CLOSE_HOUR", 16),
            slot_minutes: parse_var("CLINIC_SLOT_MINUTES", 60),
            clinic_utc_offset_minutes: parse_var("CLINIC_UTC_OFFSET_MINUTES", 0),
            direct_booking: parse_var("CLINIC_DIRECT_BOOKING", true),
            max_lock_attempts: parse_var("CLINIC_MAX_LOCK_ATTEMPTS", 3),
            lock_ttl_seconds: parse_var("CLINIC_LOCK_TTL_SECONDS", 30),
        }
    }

    pub fn clinic_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.clinic_utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    pub fn is_valid(&self) -> bool {
        self.open_hour < self.close_hour && self.close_hour <= 24 && self.slot_minutes > 0
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            open_hour: 8,
            close_hour: 16,
            slot_minutes: 60,
            clinic_utc_offset_minutes: 0,
            direct_booking: true,
            max_lock_attempts: 3,
            lock_ttl_seconds: 30,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has an unparsable value {:?}, using default", name, raw);
            default
        }),
        Err(_) => default,
    }
}
