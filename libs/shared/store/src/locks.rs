use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Lock key for a doctor's calendar on one day. Calendar checks for a
/// window serialize on the day(s) the window touches.
pub fn doctor_day_key(doctor_id: Uuid, date: NaiveDate) -> String {
    format!("doctor:{}:{}", doctor_id, date)
}

/// Lock key for one resource unit.
pub fn resource_key(resource_id: Uuid) -> String {
    format!("resource:{}", resource_id)
}

/// Keyed try-locks guarding check-then-write sections of the scheduling
/// engine. Acquisition is all-or-none and never blocks; callers retry a
/// bounded number of times and then surface contention. Entries expire
/// after a TTL so a task that died mid-operation cannot wedge a key.
#[derive(Clone, Default)]
pub struct SchedulingLockTable {
    held: Arc<Mutex<HashMap<String, Instant>>>,
}

impl SchedulingLockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to take every key at once. Returns false without side effects
    /// when any key is already held and unexpired.
    pub async fn try_acquire_all(&self, keys: &[String], ttl: Duration) -> bool {
        let mut held = self.held.lock().await;
        let now = Instant::now();

        if keys
            .iter()
            .any(|key| held.get(key).is_some_and(|expiry| *expiry > now))
        {
            debug!("lock contention on {:?}", keys);
            return false;
        }

        for key in keys {
            held.insert(key.clone(), now + ttl);
        }
        true
    }

    pub async fn release_all(&self, keys: &[String]) {
        let mut held = self.held.lock().await;
        for key in keys {
            held.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn acquire_is_exclusive_until_released() {
        let table = SchedulingLockTable::new();
        let ttl = Duration::from_secs(30);
        let ks = keys(&["doctor:a:2025-05-01"]);

        assert!(table.try_acquire_all(&ks, ttl).await);
        assert!(!table.try_acquire_all(&ks, ttl).await);

        table.release_all(&ks).await;
        assert!(table.try_acquire_all(&ks, ttl).await);
    }

    #[tokio::test]
    async fn partial_overlap_acquires_nothing() {
        let table = SchedulingLockTable::new();
        let ttl = Duration::from_secs(30);

        assert!(table.try_acquire_all(&keys(&["a"]), ttl).await);
        assert!(!table.try_acquire_all(&keys(&["a", "b"]), ttl).await);

        // "b" must not have been taken by the failed attempt.
        assert!(table.try_acquire_all(&keys(&["b"]), ttl).await);
    }

    #[tokio::test]
    async fn expired_entries_are_free() {
        let table = SchedulingLockTable::new();
        let ks = keys(&["a"]);

        assert!(table.try_acquire_all(&ks, Duration::from_millis(5)).await);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(table.try_acquire_all(&ks, Duration::from_secs(30)).await);
    }
}
