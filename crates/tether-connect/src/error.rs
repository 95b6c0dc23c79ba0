//! Error types for the tether-connect crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("gRPC status error: {0}")]
    Status(#[from] tonic::Status),

    #[error("Invalid instance-id metadata: {0}")]
    InvalidMetadata(#[from] tonic::metadata::errors::InvalidMetadataValue),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Endpoint pool is empty")]
    EmptyPool,

    #[error("Connection to {endpoint} failed: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    #[error("Invalid driver configuration: {0}")]
    InvalidConfig(String),
}

impl ConnectError {
    /// Configuration problems stop the process; everything else is recovered
    /// by the session driver.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ConnectError::InvalidMetadata(_)
                | ConnectError::InvalidEndpoint { .. }
                | ConnectError::EmptyPool
                | ConnectError::InvalidConfig(_)
        )
    }
}
