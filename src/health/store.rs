//! Process-wide health status store.
//!
//! # Responsibilities
//! - Hold the liveness and readiness statuses the orchestrator probes read
//! - Serve arbitrary concurrent reads while the node machine writes
//!
//! # Design Decisions
//! - One `RwLock` per field: probes of one status never contend with writes
//!   to the other
//! - Setters return the previous value
//! - Statuses are semantic values; the HTTP 200/418 encoding happens only at
//!   the probe boundary

use std::sync::RwLock;

use axum::http::StatusCode;

/// Semantic health value for a single probe field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Healthy,
    Unhealthy,
}

impl Status {
    /// HTTP encoding used by the probe endpoints.
    pub fn as_http(self) -> StatusCode {
        match self {
            Status::Healthy => StatusCode::OK,
            Status::Unhealthy => StatusCode::IM_A_TEAPOT,
        }
    }
}

/// Thread-safe holder of the two orchestrator-facing statuses.
///
/// Written only by the node state machine; shared read-only with the
/// probe-facing server. Both fields start `Healthy`.
#[derive(Debug)]
pub struct HealthStore {
    liveness: RwLock<Status>,
    readiness: RwLock<Status>,
}

impl HealthStore {
    pub fn new() -> Self {
        Self {
            liveness: RwLock::new(Status::Healthy),
            readiness: RwLock::new(Status::Healthy),
        }
    }

    pub fn liveness(&self) -> Status {
        *read(&self.liveness)
    }

    pub fn readiness(&self) -> Status {
        *read(&self.readiness)
    }

    /// Overwrite the liveness status, returning the previous value.
    pub fn set_liveness(&self, status: Status) -> Status {
        std::mem::replace(&mut write(&self.liveness), status)
    }

    /// Overwrite the readiness status, returning the previous value.
    pub fn set_readiness(&self, status: Status) -> Status {
        std::mem::replace(&mut write(&self.readiness), status)
    }
}

impl Default for HealthStore {
    fn default() -> Self {
        Self::new()
    }
}

// A poisoned lock still holds a valid status, so recover instead of panicking.
fn read(lock: &RwLock<Status>) -> std::sync::RwLockReadGuard<'_, Status> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write(lock: &RwLock<Status>) -> std::sync::RwLockWriteGuard<'_, Status> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}
