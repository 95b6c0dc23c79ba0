//! Timing configuration for the session driver

use crate::error::ConnectError;
use std::time::Duration;

/// Timing knobs of the Connecting/Active/Disconnecting cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverConfig {
    /// Delay between two queries of an active session
    ///
    /// **Default:** 1s
    pub pacing_interval: Duration,

    /// Soft deadline of a fresh session, counted from connection
    ///
    /// **Default:** 2s
    pub initial_grace: Duration,

    /// Pause after a failed connection attempt and after every teardown
    ///
    /// **Default:** 1s
    pub backoff: Duration,

    /// Length of one unit of a reply's `disconnect` offset
    ///
    /// **Default:** 1s
    pub hint_unit: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            pacing_interval: Duration::from_secs(1),
            initial_grace: Duration::from_secs(2),
            backoff: Duration::from_secs(1),
            hint_unit: Duration::from_secs(1),
        }
    }
}

impl DriverConfig {
    /// Validate the configuration
    ///
    /// A zero pacing interval or backoff would turn the driver into a busy
    /// loop, and a zero hint unit would make every hint meaningless.
    pub fn validate(&self) -> Result<(), ConnectError> {
        if self.pacing_interval.is_zero() {
            return Err(ConnectError::InvalidConfig(
                "pacing_interval must be greater than 0".to_string(),
            ));
        }

        if self.backoff.is_zero() {
            return Err(ConnectError::InvalidConfig(
                "backoff must be greater than 0".to_string(),
            ));
        }

        if self.hint_unit.is_zero() {
            return Err(ConnectError::InvalidConfig(
                "hint_unit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Offset from now to the deadline requested by a non-zero hint.
    ///
    /// Negative hints clamp to zero, i.e. the deadline is reached immediately.
    pub fn hint_offset(&self, hint: i64) -> Duration {
        let units = u32::try_from(hint.max(0)).unwrap_or(u32::MAX);
        self.hint_unit.saturating_mul(units)
    }
}
