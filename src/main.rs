//! Contagion node binary.
//!
//! Starts one replica: binds the face and probe listeners, wires the state
//! machine to the health store, and serves until the orchestrator kills the
//! process or a termination signal arrives.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use contagion::config::{self, NodeConfig};
use contagion::health::HealthStore;
use contagion::lifecycle::Shutdown;
use contagion::node::Node;

#[derive(Parser)]
#[command(name = "contagion")]
#[command(about = "Fault-injection replica that spreads a simulated failure across a fleet", long_about = None)]
struct Args {
    /// Peer-facing HTTP service address.
    #[arg(long, default_value = "0.0.0.0:80")]
    face: String,

    /// Probe-facing health service address.
    #[arg(long, default_value = "0.0.0.0:81")]
    probe: String,

    /// Delay between getting infected and showing symptoms, in milliseconds.
    #[arg(long, default_value_t = 5000)]
    symptom_delay: u64,

    /// Delay between symptom onset and failing the probes, in milliseconds.
    #[arg(long, default_value_t = 500)]
    health_delay: u64,

    /// Interval between sneezes while frenzied, in milliseconds. How many
    /// sneezes happen depends on how fast the container is killed.
    #[arg(long, default_value_t = 500)]
    sneeze_interval: u64,

    /// Start an infection on this node without waiting to be sneezed on.
    #[arg(long)]
    patient_zero: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contagion=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = NodeConfig {
        service_addr: config::resolve_service_addr(&args.face),
        face_addr: args.face,
        probe_addr: args.probe,
        symptom_delay: Duration::from_millis(args.symptom_delay),
        health_delay: Duration::from_millis(args.health_delay),
        sneeze_interval: Duration::from_millis(args.sneeze_interval),
    };

    tracing::info!(
        face = %config.face_addr,
        probe = %config.probe_addr,
        service = %config.service_addr,
        "contagion node starting"
    );

    // A node that cannot serve its probes cannot fulfill its role, so bind
    // failures are fatal.
    let face_listener = TcpListener::bind(&config.face_addr).await?;
    let probe_listener = TcpListener::bind(&config.probe_addr).await?;

    let shutdown = Shutdown::new();
    let node = Node::new(config, Arc::new(HealthStore::new()), shutdown.clone());

    if args.patient_zero {
        node.infect_self();
    }

    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.trigger();
            }
        }
    });

    node.serve(face_listener, probe_listener).await?;

    tracing::info!("node stopped");
    Ok(())
}
