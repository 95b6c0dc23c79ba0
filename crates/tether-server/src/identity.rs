//! Client instance identity
//!
//! Clients tag every call with an `instance-id` metadata entry. The server only
//! logs it; it never influences routing or the disconnect decision.

use std::fmt;
use tether_proto::INSTANCE_ID_KEY;
use tonic::{Request, Status};

/// Identity of the calling client instance, stored as a request extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceId(pub String);

impl InstanceId {
    pub const UNKNOWN: &'static str = "unknown";

    /// Identity carried by a request, or `unknown`
    pub fn of<T>(request: &Request<T>) -> InstanceId {
        request
            .extensions()
            .get::<InstanceId>()
            .cloned()
            .unwrap_or_else(|| InstanceId(Self::UNKNOWN.to_string()))
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interceptor copying the `instance-id` metadata into an [`InstanceId`]
/// extension. Calls without the entry are accepted as `unknown`.
pub fn instance_identity(mut request: Request<()>) -> Result<Request<()>, Status> {
    let id = request
        .metadata()
        .get(INSTANCE_ID_KEY)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(InstanceId::UNKNOWN)
        .to_string();

    request.extensions_mut().insert(InstanceId(id));
    Ok(request)
}
