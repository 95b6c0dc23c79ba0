/*!
 * Client bootstrap: wires configuration to a running session driver
 */

use std::future::Future;
use tether_connect::{DriverStats, EndpointSelector, GrpcTransport, SessionDriver};
use tracing::info;

use crate::config::ClientConfig;
use crate::error::Result;

/// Build a session driver from a validated configuration
pub fn build_driver(config: &ClientConfig) -> Result<SessionDriver<GrpcTransport>> {
    config.validate()?;

    let instance_id = config.resolve_instance_id();
    let transport = GrpcTransport::new(&instance_id)?
        .with_connect_timeout(config.connect_timeout())
        .with_call_timeout(config.call_timeout());

    let pool = config.endpoint_pool()?;
    let selector = match config.seed {
        Some(seed) => EndpointSelector::with_seed(pool, seed)?,
        None => EndpointSelector::new(pool)?,
    };

    info!(
        "Client {} | Endpoints: {}",
        instance_id,
        config.endpoints.join(", ")
    );

    Ok(SessionDriver::new(
        transport,
        selector,
        config.to_driver_config(),
    )?)
}

/// Run the client until `shutdown` resolves
///
/// Only misconfiguration returns an error; unreachable servers are retried
/// until shutdown.
pub async fn run_client<F>(config: &ClientConfig, shutdown: F) -> Result<DriverStats>
where
    F: Future<Output = ()>,
{
    let driver = build_driver(config)?;
    Ok(driver.run_until(shutdown).await)
}
