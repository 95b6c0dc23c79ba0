//! Tether Connect: client-side session layer for a pool of Tether servers
//!
//! This crate keeps a single logical client attached to one of several
//! interchangeable servers, reconnecting whenever the server asks it to leave
//! or the channel breaks.
//!
//! # Architecture
//!
//! - **EndpointSelector**: uniform random choice over the configured pool
//! - **SessionDriver**: Connecting → Active → Disconnecting state machine
//! - **Session**: one channel plus its sequence number and soft deadline
//! - **Transport / Link**: the RPC seam, implemented over tonic by `GrpcTransport`
//!
//! # Example
//!
//! ```rust,no_run
//! use tether_connect::{parse_pool, DriverConfig, EndpointSelector, GrpcTransport, SessionDriver};
//!
//! async fn example() -> Result<(), tether_connect::ConnectError> {
//!     let pool = parse_pool(&["localhost:50051"])?;
//!     let driver = SessionDriver::new(
//!         GrpcTransport::new("instance-1")?,
//!         EndpointSelector::new(pool)?,
//!         DriverConfig::default(),
//!     )?;
//!
//!     // Never returns: reconnects forever
//!     driver.run().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod driver;
pub mod endpoint;
pub mod error;
pub mod selector;
pub mod session;
pub mod transport;

pub use config::DriverConfig;
pub use driver::{DriverState, DriverStats, SessionDriver, TeardownReason};
pub use endpoint::{parse_pool, Endpoint};
pub use error::ConnectError;
pub use selector::EndpointSelector;
pub use session::{DeadlineUpdate, Session};
pub use transport::{GrpcLink, GrpcTransport, Link, Transport};
