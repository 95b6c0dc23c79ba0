//! Error types for the tether-server crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid disconnect policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid server configuration: {0}")]
    InvalidConfig(String),

    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
