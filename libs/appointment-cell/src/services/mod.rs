pub mod engine;
pub mod lifecycle;

pub use engine::SchedulingEngine;
pub use lifecycle::AppointmentLifecycle;
