//! Shutdown coordination for the node.

use tokio::sync::broadcast;

/// Coordinator for process-wide shutdown.
///
/// The infection timers, the sneeze loop, and both HTTP servers subscribe to
/// this channel. In production only a termination signal triggers it (the
/// frenzy is designed to run until the orchestrator kills the pod); tests
/// trigger it directly to stop the otherwise never-ending loop.
#[derive(Clone)]
pub struct Shutdown {
    /// Broadcast channel sender.
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
