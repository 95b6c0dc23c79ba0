//! Tether Server - answers StartTransaction calls and tells clients when to
//! leave.
//!
//! The disconnect threshold comes from `MAX_TRANSACTIONS` (default 50).

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use tether_server::{DisconnectPolicy, ServerConfig};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Tether Server - session-layer endpoint with a sequence-based disconnect policy.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "50051")]
    port: u16,

    /// Bind address (default: all interfaces)
    #[arg(short, long, default_value = "0.0.0.0")]
    bind: String,

    /// Sequence id from which every reply asks the client to disconnect
    #[arg(long, env = "MAX_TRANSACTIONS", default_value_t = DisconnectPolicy::DEFAULT_THRESHOLD)]
    max_transactions: i64,

    /// Non-zero reply value sent with a disconnect instruction
    #[arg(long, env = "DISCONNECT_HINT", default_value_t = DisconnectPolicy::DEFAULT_HINT, allow_negative_numbers = true)]
    disconnect_hint: i64,

    /// Maximum number of calls handled at the same time
    #[arg(short, long, env = "TETHER_WORKERS", default_value = "10")]
    workers: usize,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize logging
    let filter = if args.debug {
        "debug,tether_server=trace"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let listen: SocketAddr = format!("{}:{}", args.bind, args.port)
        .parse()
        .context("Failed to parse bind address")?;

    let policy = DisconnectPolicy::new(args.max_transactions, args.disconnect_hint)
        .context("Invalid disconnect policy")?;

    let config = ServerConfig {
        listen,
        policy,
        max_concurrent_calls: args.workers,
    };
    config.validate().context("Invalid server configuration")?;

    info!("Tether Server v{}", env!("CARGO_PKG_VERSION"));

    tether_server::serve(
        config,
        tether_server::shutdown_signal(tokio::signal::ctrl_c()),
    )
    .await
    .context("gRPC server failed")?;

    Ok(())
}
