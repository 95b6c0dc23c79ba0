//! Tether server library.
//!
//! This crate provides the server side of the Tether session layer: the pure
//! disconnect policy, the gRPC `TransactionManager` service applying it, and
//! helpers to serve it with graceful shutdown.

pub mod config;
pub mod error;
pub mod identity;
pub mod policy;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use policy::{decide, Decision, DisconnectPolicy};
pub use server::{ServerStats, StatsSnapshot, TransactionService};

use std::future::Future;
use std::io;
use tether_proto::transaction_manager_server::TransactionManagerServer;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tracing::{error, info};

/// Serve on `config.listen` until `shutdown` resolves.
pub async fn serve<F>(config: ServerConfig, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let listener = TcpListener::bind(config.listen).await?;
    serve_listener(listener, config, shutdown).await
}

/// Serve on an already bound listener until `shutdown` resolves.
///
/// `config.listen` is ignored; tests bind port 0 and read the real address
/// from the listener.
pub async fn serve_listener<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    config.validate()?;

    let service = TransactionService::new(config.policy, config.max_concurrent_calls);
    serve_service(listener, service, shutdown).await
}

/// Serve a prepared service, keeping access to its [`ServerStats`].
pub async fn serve_service<F>(
    listener: TcpListener,
    service: TransactionService,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    info!(
        "Serving on {} | Max transactions: {} | Disconnect hint: {} | Workers: {}",
        addr,
        service.policy().threshold(),
        service.policy().hint(),
        service.idle_workers()
    );

    Server::builder()
        .add_service(TransactionManagerServer::with_interceptor(
            service,
            identity::instance_identity,
        ))
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), shutdown)
        .await?;

    info!("Server on {} stopped", addr);
    Ok(())
}

/// Resolve once `signal` fires.
///
/// If the signal cannot be installed the returned future never resolves, so
/// the server keeps running instead of stopping right after startup.
pub async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
