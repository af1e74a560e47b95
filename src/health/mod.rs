//! Health status tracking and orchestrator probe handling.

pub mod probes;
pub mod store;

pub use store::{HealthStore, Status};
