pub mod locks;
pub mod memory;

pub use locks::{doctor_day_key, resource_key, SchedulingLockTable};
pub use memory::{ClinicState, ClinicStore};

use shared_config::AppConfig;

/// Shared state handed to every router: configuration plus the store.
/// Cheap to clone; the store is reference counted internally.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: ClinicStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            store: ClinicStore::new(),
        }
    }
}
