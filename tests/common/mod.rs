//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use contagion::config::NodeConfig;
use contagion::health::HealthStore;
use contagion::lifecycle::Shutdown;
use contagion::node::Node;

/// A node under test, listening on ephemeral ports.
pub struct TestNode {
    pub face_addr: SocketAddr,
    pub probe_addr: SocketAddr,
    pub node: Arc<Node>,
    pub shutdown: Shutdown,
}

impl TestNode {
    pub fn face_url(&self) -> String {
        format!("http://{}/face", self.face_addr)
    }

    pub fn probe_url(&self, path: &str) -> String {
        format!("http://{}{}", self.probe_addr, path)
    }
}

impl Drop for TestNode {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start a full node with both servers running.
///
/// Sneezes go to `service_addr` when given, otherwise to the node's own face
/// (the degraded self-sneezing mode).
#[allow(dead_code)]
pub async fn start_node(
    symptom_ms: u64,
    health_ms: u64,
    sneeze_ms: u64,
    service_addr: Option<SocketAddr>,
) -> TestNode {
    let face_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let probe_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let face_addr = face_listener.local_addr().unwrap();
    let probe_addr = probe_listener.local_addr().unwrap();

    let config = NodeConfig {
        face_addr: face_addr.to_string(),
        probe_addr: probe_addr.to_string(),
        service_addr: service_addr.unwrap_or(face_addr).to_string(),
        symptom_delay: Duration::from_millis(symptom_ms),
        health_delay: Duration::from_millis(health_ms),
        sneeze_interval: Duration::from_millis(sneeze_ms),
    };

    let shutdown = Shutdown::new();
    let node = Node::new(config, Arc::new(HealthStore::new()), shutdown.clone());

    let serve_node = node.clone();
    tokio::spawn(async move {
        let _ = serve_node.serve(face_listener, probe_listener).await;
    });

    // Let the servers come up before the test starts poking them.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestNode {
        face_addr,
        probe_addr,
        node,
        shutdown,
    }
}

/// Start a mock peer that answers every request with 200 and counts hits.
#[allow(dead_code)]
pub async fn start_peer_sink() -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(async move {
                        let mut buf = [0u8; 1024];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket
                            .write_all(
                                b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\nConnection: close\r\n\r\neww\n",
                            )
                            .await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, hits)
}

/// Start a mock peer that accepts connections and slams them shut, so every
/// sneeze against it fails at the transport level. Still counts hits.
#[allow(dead_code)]
pub async fn start_peer_slammer() -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    counter.fetch_add(1, Ordering::SeqCst);
                    drop(socket);
                }
                Err(_) => break,
            }
        }
    });

    (addr, hits)
}
