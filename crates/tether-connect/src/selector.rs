//! Endpoint Selector: uniform random choice over a fixed pool
//!
//! Every call draws independently from the full pool. This is deliberately not
//! a rotation and not failure-aware: the endpoint that just refused a
//! connection may be returned again immediately.

use crate::endpoint::Endpoint;
use crate::error::ConnectError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces an unbounded sequence of endpoints drawn uniformly at random.
///
/// The generator is owned by the selector, so two selectors built with the
/// same seed yield the same sequence.
///
/// # Example
///
/// ```
/// use tether_connect::{Endpoint, EndpointSelector};
///
/// let pool: Vec<Endpoint> = vec!["localhost:50051".parse().unwrap()];
/// let mut selector = EndpointSelector::with_seed(pool, 7).unwrap();
///
/// assert_eq!(selector.pick().to_string(), "localhost:50051");
/// ```
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    pool: Vec<Endpoint>,
    rng: StdRng,
}

impl EndpointSelector {
    /// Create a selector seeded from the operating system.
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::EmptyPool` if `pool` has no endpoints.
    pub fn new(pool: Vec<Endpoint>) -> Result<Self, ConnectError> {
        Self::with_rng(pool, StdRng::from_os_rng())
    }

    /// Create a selector with a fixed seed for reproducible selection.
    pub fn with_seed(pool: Vec<Endpoint>, seed: u64) -> Result<Self, ConnectError> {
        Self::with_rng(pool, StdRng::seed_from_u64(seed))
    }

    fn with_rng(pool: Vec<Endpoint>, rng: StdRng) -> Result<Self, ConnectError> {
        if pool.is_empty() {
            return Err(ConnectError::EmptyPool);
        }
        Ok(Self { pool, rng })
    }

    /// Draw the next endpoint. Never fails.
    pub fn pick(&mut self) -> Endpoint {
        let idx = self.rng.random_range(0..self.pool.len());
        self.pool[idx].clone()
    }

    pub fn pool(&self) -> &[Endpoint] {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Always false: construction rejects empty pools.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

impl Iterator for EndpointSelector {
    type Item = Endpoint;

    fn next(&mut self) -> Option<Endpoint> {
        Some(self.pick())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::parse_pool;
    use std::collections::HashMap;

    fn pool(n: u16) -> Vec<Endpoint> {
        (0..n)
            .map(|i| Endpoint::new("10.0.0.1", 50051 + i).unwrap())
            .collect()
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        assert!(matches!(
            EndpointSelector::new(Vec::new()),
            Err(ConnectError::EmptyPool)
        ));
    }

    #[test]
    fn test_single_endpoint_pool() {
        let only = parse_pool(&["localhost:50051"]).unwrap();
        let mut selector = EndpointSelector::new(only.clone()).unwrap();

        for _ in 0..100 {
            assert_eq!(selector.pick(), only[0]);
        }
    }

    #[test]
    fn test_seeded_selectors_agree() {
        let a: Vec<_> = EndpointSelector::with_seed(pool(5), 42)
            .unwrap()
            .take(50)
            .collect();
        let b: Vec<_> = EndpointSelector::with_seed(pool(5), 42)
            .unwrap()
            .take(50)
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_repeats_occur() {
        // A rotation would never return the same endpoint twice in a row
        let picks: Vec<_> = EndpointSelector::with_seed(pool(3), 1)
            .unwrap()
            .take(200)
            .collect();
        assert!(picks.windows(2).any(|w| w[0] == w[1]));
    }

    #[test]
    fn test_distribution_is_uniform() {
        const DRAWS: usize = 60_000;

        for k in [2u16, 3, 5, 8] {
            let mut selector = EndpointSelector::with_seed(pool(k), 0xC0FFEE + k as u64).unwrap();
            let mut counts: HashMap<Endpoint, usize> = HashMap::new();
            for _ in 0..DRAWS {
                *counts.entry(selector.pick()).or_default() += 1;
            }
            assert_eq!(counts.len(), k as usize, "every endpoint is reachable");

            let expected = DRAWS as f64 / k as f64;
            let chi_squared: f64 = counts
                .values()
                .map(|&observed| {
                    let d = observed as f64 - expected;
                    d * d / expected
                })
                .sum();

            // Far above the 0.999 quantile for k-1 <= 7 degrees of freedom (24.3)
            assert!(
                chi_squared < 40.0,
                "chi-squared {} too large for pool of {}",
                chi_squared,
                k
            );
        }
    }
}
