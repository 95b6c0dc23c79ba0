//! Disconnect Policy
//!
//! Decides, per request and without any stored state, whether the client
//! should be told to leave. Nothing here depends on the RPC framework.

use crate::error::ServerError;
use std::fmt;

/// Outcome of evaluating one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    /// Leave the client's deadline untouched
    Continue,
    /// Instruct the client to disconnect
    Disconnect,
}

impl Decision {
    pub fn as_str(&self) -> &str {
        match self {
            Decision::Continue => "continue",
            Decision::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Disconnect` iff `sequence_id >= threshold`.
///
/// Ids are evaluated one at a time; nothing assumes they are monotonic across
/// sessions.
pub fn decide(sequence_id: i64, threshold: i64) -> Decision {
    if sequence_id >= threshold {
        Decision::Disconnect
    } else {
        Decision::Continue
    }
}

/// Threshold plus the reply value used to signal "disconnect".
///
/// Read once at startup and shared read-only by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisconnectPolicy {
    threshold: i64,
    hint: i64,
}

impl DisconnectPolicy {
    /// Default threshold when `MAX_TRANSACTIONS` is unset
    pub const DEFAULT_THRESHOLD: i64 = 50;

    /// Default reply value for "disconnect": a negative offset, so the
    /// client's deadline is reached as soon as the reply arrives
    pub const DEFAULT_HINT: i64 = -1;

    /// Create a policy
    ///
    /// # Errors
    ///
    /// Returns `ServerError::InvalidPolicy` if `threshold` is negative or
    /// `hint` is zero (zero means "no change" on the wire).
    pub fn new(threshold: i64, hint: i64) -> Result<Self, ServerError> {
        if threshold < 0 {
            return Err(ServerError::InvalidPolicy(format!(
                "threshold must be non-negative, got {}",
                threshold
            )));
        }

        if hint == 0 {
            return Err(ServerError::InvalidPolicy(
                "disconnect hint must be non-zero".to_string(),
            ));
        }

        Ok(Self { threshold, hint })
    }

    /// Policy with the given threshold and the default hint
    pub fn with_threshold(threshold: i64) -> Result<Self, ServerError> {
        Self::new(threshold, Self::DEFAULT_HINT)
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    pub fn hint(&self) -> i64 {
        self.hint
    }

    pub fn decide(&self, sequence_id: i64) -> Decision {
        decide(sequence_id, self.threshold)
    }

    /// Value of the reply's `disconnect` field for `decision`
    pub fn reply_value(&self, decision: Decision) -> i64 {
        match decision {
            Decision::Continue => 0,
            Decision::Disconnect => self.hint,
        }
    }
}

impl Default for DisconnectPolicy {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            hint: Self::DEFAULT_HINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_exactness() {
        for threshold in [0i64, 1, 3, 50, 1_000_000] {
            if threshold > 0 {
                assert_eq!(decide(threshold - 1, threshold), Decision::Continue);
            }
            assert_eq!(decide(threshold, threshold), Decision::Disconnect);
            assert_eq!(decide(threshold + 1, threshold), Decision::Disconnect);
        }
    }

    #[test]
    fn test_monotone_in_sequence_id() {
        let threshold = 7;
        let decisions: Vec<Decision> = (0..20).map(|id| decide(id, threshold)).collect();
        let first = decisions
            .iter()
            .position(|d| *d == Decision::Disconnect)
            .unwrap();

        assert_eq!(first, 7);
        assert!(decisions[first..].iter().all(|d| *d == Decision::Disconnect));
        assert!(decisions[..first].iter().all(|d| *d == Decision::Continue));
    }

    #[test]
    fn test_out_of_order_ids_are_independent() {
        let policy = DisconnectPolicy::with_threshold(3).unwrap();
        // A new session on the same server restarts at zero
        let ids = [4, 5, 0, 1, 3, 0];
        let decisions: Vec<_> = ids.iter().map(|&id| policy.decide(id)).collect();
        assert_eq!(
            decisions,
            vec![
                Decision::Disconnect,
                Decision::Disconnect,
                Decision::Continue,
                Decision::Continue,
                Decision::Disconnect,
                Decision::Continue,
            ]
        );
    }

    #[test]
    fn test_zero_threshold_always_disconnects() {
        let policy = DisconnectPolicy::with_threshold(0).unwrap();
        assert_eq!(policy.decide(0), Decision::Disconnect);
    }

    #[test]
    fn test_reply_values() {
        let policy = DisconnectPolicy::new(10, 20).unwrap();
        assert_eq!(policy.reply_value(Decision::Continue), 0);
        assert_eq!(policy.reply_value(Decision::Disconnect), 20);

        let default = DisconnectPolicy::default();
        assert_eq!(default.threshold(), 50);
        assert_eq!(default.reply_value(Decision::Disconnect), -1);
    }

    #[test]
    fn test_validation_failures() {
        assert!(DisconnectPolicy::new(-1, -1).is_err());
        assert!(DisconnectPolicy::new(5, 0).is_err());
        assert!(DisconnectPolicy::new(0, 1).is_ok());
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Continue.to_string(), "continue");
        assert_eq!(Decision::Disconnect.to_string(), "disconnect");
    }
}
