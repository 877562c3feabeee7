pub mod actor;
pub mod appointment;
pub mod care;
pub mod error;
pub mod people;
pub mod resource;
pub mod time;
