//! Transport seam between the session driver and the RPC channel
//!
//! The driver only needs two capabilities: open a channel to an endpoint and
//! issue one `StartTransaction` call on it. `GrpcTransport` provides them over
//! tonic; tests substitute scripted implementations.

use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use async_trait::async_trait;
use std::time::Duration;
use tether_proto::{
    transaction_manager_client::TransactionManagerClient, Query, Reply, INSTANCE_ID_KEY,
};
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::{Channel, Endpoint as ChannelEndpoint};
use tracing::debug;

/// Opens channels to endpoints
#[async_trait]
pub trait Transport: Send + Sync {
    /// The channel handle. Dropping it releases the channel.
    type Link: Link;

    async fn connect(&self, endpoint: &Endpoint) -> Result<Self::Link, ConnectError>;
}

/// One established channel
#[async_trait]
pub trait Link: Send {
    async fn start_transaction(&mut self, query: Query) -> Result<Reply, ConnectError>;
}

/// gRPC transport backed by tonic channels.
///
/// Every call carries the `instance-id` metadata and a per-call timeout.
#[derive(Debug, Clone)]
pub struct GrpcTransport {
    instance_id: MetadataValue<Ascii>,
    connect_timeout: Duration,
    call_timeout: Duration,
}

impl GrpcTransport {
    /// Create a transport identifying itself as `instance_id`
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::InvalidMetadata` if `instance_id` is not a valid
    /// ASCII metadata value.
    pub fn new(instance_id: &str) -> Result<Self, ConnectError> {
        Ok(Self {
            instance_id: instance_id.parse()?,
            connect_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(5),
        })
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn instance_id(&self) -> &str {
        self.instance_id.to_str().unwrap_or_default()
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    type Link = GrpcLink;

    async fn connect(&self, endpoint: &Endpoint) -> Result<GrpcLink, ConnectError> {
        let channel = ChannelEndpoint::from_shared(endpoint.uri())
            .map_err(|e| ConnectError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?
            .connect_timeout(self.connect_timeout)
            .timeout(self.call_timeout)
            .connect()
            .await
            .map_err(|e| ConnectError::ConnectionFailed {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        debug!("Channel established to {}", endpoint);

        Ok(GrpcLink {
            client: TransactionManagerClient::new(channel),
            instance_id: self.instance_id.clone(),
        })
    }
}

/// A connected tonic channel
#[derive(Debug)]
pub struct GrpcLink {
    client: TransactionManagerClient<Channel>,
    instance_id: MetadataValue<Ascii>,
}

#[async_trait]
impl Link for GrpcLink {
    async fn start_transaction(&mut self, query: Query) -> Result<Reply, ConnectError> {
        let mut request = tonic::Request::new(query);
        request
            .metadata_mut()
            .insert(INSTANCE_ID_KEY, self.instance_id.clone());

        let reply = self.client.start_transaction(request).await?;
        Ok(reply.into_inner())
    }
}
