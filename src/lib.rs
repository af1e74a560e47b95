//! Contagion — a fault-injection replica for orchestrator eviction testing.
//!
//! Every replica ("node") in the fleet runs this binary. A node exposes two
//! HTTP listeners: a probe-facing one the orchestrator polls for liveness and
//! readiness, and a peer-facing one ("the face") on which other nodes sneeze.
//!
//! # Architecture Overview
//!
//! ```text
//!   peer sneeze (POST /face) ──▶ http::face ──▶ node::machine
//!                                                   │
//!                                 symptom timer ◀───┤ Healthy → Incubating (CAS)
//!                                                   ▼
//!                                              enter_frenzy
//!                                  ┌────────────────┼─────────────────┐
//!                                  ▼                ▼                 ▼
//!                           close face      node::sneeze loop    health timer
//!                           listener        (POST /face at the       │
//!                                           service address)         ▼
//!                                                           health::store flips
//!                                                           to Unhealthy
//!                                                                    │
//!   orchestrator probes (GET /liveness, /readiness) ◀── health::probes
//! ```
//!
//! The orchestrator then evicts the node; the fleet heals itself while the
//! infection keeps spreading through the load-balanced service address.

// Core subsystems
pub mod config;
pub mod health;
pub mod http;
pub mod node;

// Cross-cutting concerns
pub mod lifecycle;

pub use config::NodeConfig;
pub use health::HealthStore;
pub use lifecycle::Shutdown;
pub use node::Node;
