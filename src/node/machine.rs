//! Infection lifecycle state machine.
//!
//! # States
//! - Healthy: accepting peer traffic, probes green
//! - Incubating: infected, outwardly silent, symptom timer armed
//! - Frenzied: face listener closing, sneezing on peers, probes soon red
//!
//! # State Transitions
//! ```text
//! Healthy → Incubating: first accepted infection notification (one winner)
//! Incubating → Frenzied: symptom_delay elapsed
//! Frenzied: terminal; the orchestrator is expected to kill the process
//! ```
//!
//! # Design Decisions
//! - The Healthy → Incubating guard is a single compare-and-set on the state
//!   enum, so exactly one notification wins under arbitrary concurrency
//! - Timers are detached tasks that also listen for shutdown, so tests can
//!   drain them deterministically

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::time;

use crate::config::NodeConfig;
use crate::health::{HealthStore, Status};
use crate::lifecycle::Shutdown;
use crate::node::sneeze;

/// How long in-flight face requests get to finish once the frenzy starts.
const FACE_SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// Fatal node errors; anything here takes the process down.
#[derive(Debug, Error)]
pub enum NodeError {
    #[error("listener error: {0}")]
    Listener(#[from] std::io::Error),
}

/// Infection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum NodeState {
    Healthy = 0,
    Incubating = 1,
    Frenzied = 2,
}

impl NodeState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => NodeState::Healthy,
            1 => NodeState::Incubating,
            _ => NodeState::Frenzied,
        }
    }
}

/// One replica of the contagion fleet.
///
/// Owns the infection lifecycle for this process: the state enum, the timers
/// that advance it, and the health store writes that follow from it.
pub struct Node {
    config: NodeConfig,
    state: AtomicU8,
    health: Arc<HealthStore>,
    client: reqwest::Client,
    shutdown: Shutdown,
    /// Flipped to true exactly once, at frenzy entry, to close the face
    /// listener. Level-triggered, so a frenzy that happens before `serve`
    /// wires the face server still closes it.
    face_stop: watch::Sender<bool>,
}

impl Node {
    pub fn new(config: NodeConfig, health: Arc<HealthStore>, shutdown: Shutdown) -> Arc<Self> {
        let (face_stop, _) = watch::channel(false);
        Arc::new(Self {
            config,
            state: AtomicU8::new(NodeState::Healthy as u8),
            health,
            client: reqwest::Client::new(),
            shutdown,
            face_stop,
        })
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> NodeState {
        NodeState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Handle one inbound infection notification.
    ///
    /// At most one call per process lifetime wins the Healthy → Incubating
    /// transition; every other call is a no-op. The winner arms the symptom
    /// timer and returns without waiting for it, so the caller can answer
    /// its HTTP request before any side effect lands. Returns whether this
    /// call won.
    pub fn notify_infection(self: &Arc<Self>) -> bool {
        let won = self
            .state
            .compare_exchange(
                NodeState::Healthy as u8,
                NodeState::Incubating as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok();
        if !won {
            return false;
        }

        tracing::info!(symptom_delay = ?self.config.symptom_delay, "infected; incubating");

        let node = Arc::clone(self);
        let mut stop = self.shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(node.config.symptom_delay) => node.enter_frenzy(),
                _ = stop.recv() => {}
            }
        });
        true
    }

    /// Infect this node without an inbound notification (patient zero).
    pub fn infect_self(self: &Arc<Self>) {
        tracing::info!("patient zero: starting the infection locally");
        self.notify_infection();
    }

    /// Enter the terminal frenzy phase.
    ///
    /// Closes the face listener to new peer calls, starts the sneeze loop,
    /// and arms the health timer that will flip both probe statuses to
    /// unhealthy after `health_delay`.
    pub fn enter_frenzy(self: &Arc<Self>) {
        self.state.store(NodeState::Frenzied as u8, Ordering::SeqCst);
        tracing::info!("sniff");

        // No new peer calls once frenzied; in-flight ones get a grace period
        // inside the serve task.
        self.face_stop.send_replace(true);

        sneeze::spawn_loop(
            self.client.clone(),
            self.config.service_addr.clone(),
            self.config.sneeze_interval,
            &self.shutdown,
        );

        let node = Arc::clone(self);
        let mut stop = self.shutdown.subscribe();
        tokio::spawn(async move {
            tokio::select! {
                _ = time::sleep(node.config.health_delay) => {
                    node.health.set_liveness(Status::Unhealthy);
                    node.health.set_readiness(Status::Unhealthy);
                    tracing::info!("reporting unhealthy to probes");
                }
                _ = stop.recv() => {}
            }
        });
    }

    /// Serve both listeners until process shutdown.
    ///
    /// The face server runs as a background task because it dies early, at
    /// frenzy entry; the probe server must outlive it so the orchestrator
    /// can observe the unhealthy statuses, so it runs in the foreground.
    pub async fn serve(
        self: &Arc<Self>,
        face_listener: TcpListener,
        probe_listener: TcpListener,
    ) -> Result<(), NodeError> {
        let face_addr = face_listener.local_addr()?;
        let probe_addr = probe_listener.local_addr()?;
        tracing::info!(face = %face_addr, probe = %probe_addr, "node operational");

        let face_app = crate::http::face::router(Arc::clone(self));
        let probe_app = crate::health::probes::router(Arc::clone(&self.health));

        // `wait_for` inspects the current value first, so a face stop that
        // fired before this subscription still shuts the server down.
        let mut face_rx = self.face_stop.subscribe();
        let mut proc_rx = self.shutdown.subscribe();
        let face_serve = axum::serve(face_listener, face_app).with_graceful_shutdown(async move {
            tokio::select! {
                _ = face_rx.wait_for(|stopped| *stopped) => {}
                _ = proc_rx.recv() => {}
            }
        });

        // Graceful drain with a hard deadline: dropping the serve future
        // stops the listener accepting; handlers already running finish on
        // their own connection tasks.
        let mut force_rx = self.face_stop.subscribe();
        tokio::spawn(async move {
            let force = async move {
                let _ = force_rx.wait_for(|stopped| *stopped).await;
                time::sleep(FACE_SHUTDOWN_GRACE).await;
            };
            tokio::select! {
                res = face_serve => match res {
                    Ok(()) => tracing::info!("face listener closed"),
                    Err(err) => tracing::error!(error = %err, "face server failed"),
                },
                _ = force => tracing::warn!(
                    grace = ?FACE_SHUTDOWN_GRACE,
                    "face listener did not drain within the grace period; dropping it"
                ),
            }
        });

        let mut probe_rx = self.shutdown.subscribe();
        axum::serve(probe_listener, probe_app)
            .with_graceful_shutdown(async move {
                let _ = probe_rx.recv().await;
            })
            .await?;
        Ok(())
    }
}
