/*!
 * Tether - resilient client sessions over a pool of gRPC servers
 *
 * The client keeps one logical session attached to a randomly chosen server,
 * sends paced transactions, and reconnects elsewhere whenever the server asks
 * it to leave or the channel breaks.
 *
 * The session layer itself lives in `tether-connect`; this crate carries the
 * client process around it: configuration, logging and exit codes.
 */

pub mod client;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use client::{build_driver, run_client};
pub use config::{ClientConfig, LogLevel};
pub use error::{Result, TetherError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
