//! Session Driver: the client's connection lifecycle state machine
//!
//! The driver owns at most one [`Session`] at a time and cycles through three
//! states for as long as the process runs.
//!
//! # States
//!
//! ```text
//!                    ┌─────────────┐  connect failed: sleep(backoff)
//!        start ───>  │ Connecting  │ ──────┐
//!                    └──────┬──────┘ <─────┘
//!                           │ channel established (seq = 0, deadline = now + grace)
//!                    ┌──────▼──────┐  reply, deadline ahead: sleep(pacing)
//!                    │   Active    │ ──────┐
//!                    └──────┬──────┘ <─────┘
//!                           │ deadline reached | call failed
//!                    ┌──────▼──────┐
//!                    │Disconnecting│ ── release channel, sleep(backoff) ──> Connecting
//!                    └─────────────┘
//! ```
//!
//! A reply's non-zero `disconnect` field only moves the soft deadline. The
//! decision to leave is taken separately, by comparing the deadline with the
//! clock after each reply. Transport failures skip straight to teardown.

use crate::config::DriverConfig;
use crate::error::ConnectError;
use crate::selector::EndpointSelector;
use crate::session::{DeadlineUpdate, Session};
use crate::transport::{Link, Transport};
use std::future::Future;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Why a session is being torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownReason {
    /// The soft deadline was reached after a reply
    DeadlineExpired,
    /// The call itself failed (broken channel, timeout, bad status, decode error)
    TransportFailure,
}

impl TeardownReason {
    pub fn as_str(&self) -> &str {
        match self {
            TeardownReason::DeadlineExpired => "deadline_expired",
            TeardownReason::TransportFailure => "transport_failure",
        }
    }
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverState {
    /// Picking an endpoint and opening a channel
    Connecting,
    /// Sending paced queries on the open session
    Active,
    /// Releasing the current channel
    Disconnecting(TeardownReason),
}

impl DriverState {
    pub fn as_str(&self) -> &str {
        match self {
            DriverState::Connecting => "connecting",
            DriverState::Active => "active",
            DriverState::Disconnecting(_) => "disconnecting",
        }
    }
}

/// Counters describing what the driver has done so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub sessions_opened: u64,
    pub sessions_closed: u64,
    pub connect_failures: u64,
    pub queries_sent: u64,
    pub deadline_expiries: u64,
    pub transport_failures: u64,
}

/// Drives one client through the Connecting/Active/Disconnecting cycle.
///
/// # Example
///
/// ```rust,no_run
/// use tether_connect::{parse_pool, DriverConfig, EndpointSelector, GrpcTransport, SessionDriver};
///
/// # async fn example() -> Result<(), tether_connect::ConnectError> {
/// let pool = parse_pool(&["localhost:50051", "localhost:50053"])?;
/// let transport = GrpcTransport::new("client-1")?;
/// let driver = SessionDriver::new(transport, EndpointSelector::new(pool)?, DriverConfig::default())?;
///
/// let stats = driver.run_until(async { tokio::signal::ctrl_c().await.ok(); }).await;
/// println!("opened {} sessions", stats.sessions_opened);
/// # Ok(())
/// # }
/// ```
pub struct SessionDriver<T: Transport> {
    transport: T,
    selector: EndpointSelector,
    config: DriverConfig,
    state: DriverState,
    session: Option<Session<T::Link>>,
    stats: DriverStats,
}

impl<T: Transport> SessionDriver<T> {
    /// Create a driver in the Connecting state
    ///
    /// # Errors
    ///
    /// Returns `ConnectError::InvalidConfig` if `config` does not validate.
    pub fn new(
        transport: T,
        selector: EndpointSelector,
        config: DriverConfig,
    ) -> Result<Self, ConnectError> {
        config.validate()?;

        Ok(Self {
            transport,
            selector,
            config,
            state: DriverState::Connecting,
            session: None,
            stats: DriverStats::default(),
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// The open session, if any
    pub fn session(&self) -> Option<&Session<T::Link>> {
        self.session.as_ref()
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Perform the current state's action once and return the new state
    pub async fn tick(&mut self) -> DriverState {
        self.state = match self.state {
            DriverState::Connecting => self.connect().await,
            DriverState::Active => self.exchange().await,
            DriverState::Disconnecting(reason) => {
                debug!("Disconnecting ({})", reason.as_str());
                self.teardown();
                sleep(self.config.backoff).await;
                DriverState::Connecting
            }
        };
        self.state
    }

    /// Release the open session, if any, and return to Connecting.
    ///
    /// Returns `false` when there was nothing to release, so calling it twice
    /// in a row releases the channel exactly once.
    pub fn teardown(&mut self) -> bool {
        self.state = DriverState::Connecting;

        match self.session.take() {
            Some(session) => {
                info!(
                    "Closing session on {} after {} replies ({:?})",
                    session.endpoint(),
                    session.replies(),
                    session.opened_at().elapsed()
                );
                drop(session);
                self.stats.sessions_closed += 1;
                true
            }
            None => {
                debug!("Teardown requested with no open session");
                false
            }
        }
    }

    /// Run the cycle until `shutdown` resolves, then release the session.
    ///
    /// Connection failures never end the loop.
    pub async fn run_until<F>(mut self, shutdown: F) -> DriverStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Session driver started | Pool: {} | Pacing: {:?} | Grace: {:?} | Backoff: {:?}",
            self.selector.len(),
            self.config.pacing_interval,
            self.config.initial_grace,
            self.config.backoff
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = self.tick() => {}
            }
        }

        self.teardown();
        info!("Session driver stopped: {:?}", self.stats);
        self.stats
    }

    /// Run the cycle forever
    pub async fn run(self) -> DriverStats {
        self.run_until(std::future::pending()).await
    }

    async fn connect(&mut self) -> DriverState {
        let endpoint = self.selector.pick();
        info!("Will connect to {}", endpoint);

        match self.transport.connect(&endpoint).await {
            Ok(link) => {
                let session =
                    Session::open(endpoint, link, self.config.initial_grace, Instant::now());
                info!(
                    "Session opened on {} for {:?}",
                    session.endpoint(),
                    self.config.initial_grace
                );
                self.session = Some(session);
                self.stats.sessions_opened += 1;
                DriverState::Active
            }
            Err(e) => {
                self.stats.connect_failures += 1;
                if e.is_fatal() {
                    error!(
                        "Endpoint {} can never be dialled: {} (retrying in {:?})",
                        endpoint, e, self.config.backoff
                    );
                } else {
                    warn!(
                        "Cannot connect to {}: {} (retrying in {:?})",
                        endpoint, e, self.config.backoff
                    );
                }
                sleep(self.config.backoff).await;
                DriverState::Connecting
            }
        }
    }

    async fn exchange(&mut self) -> DriverState {
        let Some(session) = self.session.as_mut() else {
            warn!("Active without a session, reconnecting");
            return DriverState::Connecting;
        };

        let query = session.next_query();
        let id = query.id;
        self.stats.queries_sent += 1;
        debug!("Sending query #{} to {}", id, session.endpoint());

        match session.link_mut().start_transaction(query).await {
            Ok(reply) => {
                let now = Instant::now();
                let offset = self.config.hint_offset(reply.disconnect);

                if let DeadlineUpdate::Moved(deadline) = session.apply_reply(&reply, offset, now) {
                    info!(
                        "Reconnection time updated to {:?} in the future",
                        deadline.saturating_duration_since(now)
                    );
                }

                if session.is_expired(now) {
                    info!("Disconnection requested after query #{}", id);
                    self.stats.deadline_expiries += 1;
                    return DriverState::Disconnecting(TeardownReason::DeadlineExpired);
                }

                sleep(self.config.pacing_interval).await;
                DriverState::Active
            }
            Err(e) => {
                self.stats.transport_failures += 1;
                warn!(
                    "Query #{} to {} failed: {}",
                    id,
                    session.endpoint(),
                    e
                );
                DriverState::Disconnecting(TeardownReason::TransportFailure)
            }
        }
    }
}
