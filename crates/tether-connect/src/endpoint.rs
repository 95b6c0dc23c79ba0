//! Server addresses

use crate::error::ConnectError;
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// Address of one server instance in the pool.
///
/// Accepts `host:port` and `[v6addr]:port`. The value is immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    /// Create an endpoint from its parts
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConnectError> {
        let host = host.into();
        if let Err(reason) = check_host(&host) {
            return Err(ConnectError::InvalidEndpoint {
                endpoint: format!("{}:{}", host, port),
                reason: reason.to_string(),
            });
        }
        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// URI dialled by the gRPC transport
    pub fn uri(&self) -> String {
        format!("http://{}", self)
    }
}

impl FromStr for Endpoint {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConnectError::InvalidEndpoint {
            endpoint: s.to_string(),
            reason: reason.to_string(),
        };

        let (host, port) = s.trim().rsplit_once(':').ok_or_else(|| invalid("missing port"))?;

        let port = port
            .parse::<u16>()
            .map_err(|e| invalid(&format!("bad port: {}", e)))?;

        check_host(host).map_err(invalid)?;
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }
}

/// A host must be usable as the authority of an `http://` URI: a bracketed
/// IPv6 literal, or a DNS name / IPv4 address without separators.
fn check_host(host: &str) -> Result<(), &'static str> {
    if host.is_empty() {
        return Err("host is empty");
    }

    if let Some(inner) = host.strip_prefix('[') {
        return match inner.strip_suffix(']') {
            Some(addr) if addr.parse::<Ipv6Addr>().is_ok() => Ok(()),
            Some(_) => Err("bracketed host is not an IPv6 address"),
            None => Err("unbalanced brackets in IPv6 host"),
        };
    }

    if host.contains(':') {
        return Err("IPv6 host must be bracketed");
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
    {
        return Err("host contains characters not allowed in a URI authority");
    }

    Ok(())
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Parse a list of `host:port` strings into a pool
pub fn parse_pool<S: AsRef<str>>(addrs: &[S]) -> Result<Vec<Endpoint>, ConnectError> {
    addrs.iter().map(|a| a.as_ref().parse()).collect()
}
