//! Node configuration and service-address resolution.
//!
//! All parameters are fixed at startup; nothing here is reloaded at runtime.

use std::time::Duration;

/// Environment variable carrying the orchestrator's virtual service host.
pub const SERVICE_HOST_ENV: &str = "CONTAGION_SERVICE_HOST";

/// Environment variable carrying the orchestrator's virtual service port.
pub const SERVICE_PORT_ENV: &str = "CONTAGION_SERVICE_PORT";

/// Immutable per-process node parameters.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Peer-facing listener address (the "face").
    pub face_addr: String,

    /// Probe-facing listener address.
    pub probe_addr: String,

    /// Address targeted by outbound sneezes, normally the orchestrator's
    /// load-balanced service address.
    pub service_addr: String,

    /// Time between getting infected and symptom onset.
    pub symptom_delay: Duration,

    /// Time between symptom onset and failing the probes.
    pub health_delay: Duration,

    /// Period between successive sneezes while frenzied.
    pub sneeze_interval: Duration,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            face_addr: "0.0.0.0:80".to_string(),
            probe_addr: "0.0.0.0:81".to_string(),
            service_addr: "0.0.0.0:80".to_string(),
            symptom_delay: Duration::from_millis(5000),
            health_delay: Duration::from_millis(500),
            sneeze_interval: Duration::from_millis(500),
        }
    }
}

/// Resolve the address outbound sneezes should target.
///
/// The orchestrator injects its virtual service host and port through the
/// environment; routing sneezes there lets its load balancing pick the peer
/// that gets infected. When the variables are absent the node falls back to
/// its own face address: it will only ever sneeze on itself, but keeps
/// working standalone.
pub fn resolve_service_addr(face_addr: &str) -> String {
    match (std::env::var(SERVICE_HOST_ENV), std::env::var(SERVICE_PORT_ENV)) {
        (Ok(host), Ok(port)) if !host.is_empty() && !port.is_empty() => {
            format!("{}:{}", host, port)
        }
        _ => {
            tracing::warn!(
                fallback = %face_addr,
                "could not acquire service address from environment; sneezing on own face address"
            );
            face_addr.to_string()
        }
    }
}
