pub mod conditions;
pub mod prescriptions;

pub use conditions::ConditionService;
pub use prescriptions::PrescriptionService;
