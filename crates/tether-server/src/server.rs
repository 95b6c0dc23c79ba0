//! gRPC server implementation of the TransactionManager service.
//!
//! Each call is evaluated independently against the shared, read-only
//! [`DisconnectPolicy`]. A semaphore bounds how many calls are handled at the
//! same time.

use crate::identity::InstanceId;
use crate::policy::{Decision, DisconnectPolicy};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tether_proto::transaction_manager_server::TransactionManager;
use tether_proto::{Query, Reply};
use tokio::sync::Semaphore;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

/// Request counters shared by every call
#[derive(Debug, Default)]
pub struct ServerStats {
    requests: AtomicU64,
    disconnects: AtomicU64,
}

/// Point-in-time copy of [`ServerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub requests: u64,
    pub disconnects: u64,
}

impl ServerStats {
    fn record(&self, decision: Decision) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if decision == Decision::Disconnect {
            self.disconnects.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
        }
    }
}

/// Implementation of the TransactionManager gRPC interface.
#[derive(Debug, Clone)]
pub struct TransactionService {
    /// Threshold and hint, never mutated after startup
    policy: DisconnectPolicy,
    /// Bounded worker pool
    workers: Arc<Semaphore>,
    stats: Arc<ServerStats>,
}

impl TransactionService {
    /// Creates a new TransactionService.
    ///
    /// # Arguments
    ///
    /// * `policy` - Disconnect threshold and hint
    /// * `max_concurrent_calls` - Size of the worker pool
    pub fn new(policy: DisconnectPolicy, max_concurrent_calls: usize) -> Self {
        Self {
            policy,
            workers: Arc::new(Semaphore::new(max_concurrent_calls)),
            stats: Arc::new(ServerStats::default()),
        }
    }

    pub fn policy(&self) -> &DisconnectPolicy {
        &self.policy
    }

    /// Shared counters, still live after the service moves into the server
    pub fn stats(&self) -> Arc<ServerStats> {
        self.stats.clone()
    }

    /// Number of calls that could start right now without waiting
    pub fn idle_workers(&self) -> usize {
        self.workers.available_permits()
    }
}

#[tonic::async_trait]
impl TransactionManager for TransactionService {
    /// Applies the disconnect policy to one query.
    async fn start_transaction(
        &self,
        request: Request<Query>,
    ) -> Result<Response<Reply>, Status> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|_| Status::unavailable("Server is shutting down"))?;

        let peer = request
            .remote_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let instance = InstanceId::of(&request);
        let query = request.into_inner();

        let decision = self.policy.decide(query.id);
        self.stats.record(decision);

        info!(
            peer = %peer,
            instance = %instance,
            id = query.id,
            decision = %decision,
            "Got a query with id {} from {}",
            query.id,
            peer
        );

        if decision == Decision::Disconnect {
            debug!("Requesting disconnection of {} ({})", peer, instance);
        }

        Ok(Response::new(Reply {
            disconnect: self.policy.reply_value(decision),
        }))
    }
}
