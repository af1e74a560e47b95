//! Outbound infection propagation.
//!
//! While frenzied the node sneezes on "a peer" every tick. The target is the
//! orchestrator's load-balanced service address, so over time the sneezes
//! land roughly uniformly across the replica set.

use std::time::Duration;

use tokio::time;

use crate::lifecycle::Shutdown;

/// Spawn the propagation loop.
///
/// The loop never terminates on its own; only the process-wide shutdown
/// signal stops it. Every tick dispatches one sneeze without awaiting the
/// previous one, so a slow or unreachable peer never delays the cadence.
pub(crate) fn spawn_loop(
    client: reqwest::Client,
    service_addr: String,
    interval: Duration,
    shutdown: &Shutdown,
) {
    let mut stop = shutdown.subscribe();
    tokio::spawn(async move {
        let target = format!("http://{}/face", service_addr);
        tracing::info!(target = %target, interval = ?interval, "sneeze loop starting");

        // tokio panics on a zero-period interval; clamp so that a zero
        // configuration still means "as fast as possible".
        let mut ticker = time::interval(interval.max(Duration::from_millis(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let client = client.clone();
                    let target = target.clone();
                    tokio::spawn(async move {
                        if let Err(err) = sneeze(&client, &target).await {
                            // Unreachable peers are routine; the next tick
                            // is the retry.
                            tracing::debug!(error = %err, "could not sneeze");
                        }
                    });
                }
                _ = stop.recv() => break,
            }
        }
    });
}

/// POST one `action=achoo` at whatever replica the service address routes to.
async fn sneeze(client: &reqwest::Client, target: &str) -> Result<(), reqwest::Error> {
    client.post(target).form(&[("action", "achoo")]).send().await?;
    Ok(())
}
