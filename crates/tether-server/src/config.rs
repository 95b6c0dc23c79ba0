//! Server configuration

use crate::error::ServerError;
use crate::policy::DisconnectPolicy;
use std::net::SocketAddr;

/// Everything the server reads once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on
    ///
    /// **Default:** 0.0.0.0:50051
    pub listen: SocketAddr,

    /// Disconnect threshold and hint
    pub policy: DisconnectPolicy,

    /// Maximum number of calls handled simultaneously
    ///
    /// **Default:** 10
    pub max_concurrent_calls: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 50051)),
            policy: DisconnectPolicy::default(),
            max_concurrent_calls: 10,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.max_concurrent_calls == 0 {
            return Err(ServerError::InvalidConfig(
                "max_concurrent_calls must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
