//! Session: one live channel plus its sequencing and deadline state

use crate::endpoint::Endpoint;
use tether_proto::{Query, Reply};
use tokio::time::{Duration, Instant};
use tracing::warn;

/// Effect of a reply on the soft deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineUpdate {
    /// `disconnect` was zero
    Unchanged,
    /// The deadline moved to the contained instant
    Moved(Instant),
}

/// One live channel to one endpoint.
///
/// The session owns the channel (`L`); dropping the session releases it. A
/// session is never reused after teardown, which is what restarts the
/// sequence at zero for the next one.
#[derive(Debug)]
pub struct Session<L> {
    endpoint: Endpoint,
    link: L,
    next_id: i64,
    deadline: Instant,
    opened_at: Instant,
    replies: u64,
}

impl<L> Session<L> {
    /// Open a session at `now` with a deadline `grace` in the future
    pub fn open(endpoint: Endpoint, link: L, grace: Duration, now: Instant) -> Self {
        Self {
            endpoint,
            link,
            next_id: 0,
            deadline: now + grace,
            opened_at: now,
            replies: 0,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Sequence number the next query will carry
    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    pub fn replies(&self) -> u64 {
        self.replies
    }

    pub(crate) fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Build the next query and advance the sequence number
    pub fn next_query(&mut self) -> Query {
        let query = Query { id: self.next_id };
        self.next_id += 1;
        query
    }

    /// Apply a reply received at `now`.
    ///
    /// A non-zero `disconnect` replaces the deadline with `now + offset`, which
    /// may extend or shorten it. It never disconnects by itself.
    pub fn apply_reply(&mut self, reply: &Reply, offset: Duration, now: Instant) -> DeadlineUpdate {
        self.replies += 1;

        if reply.disconnect == 0 {
            return DeadlineUpdate::Unchanged;
        }

        match now.checked_add(offset) {
            Some(deadline) => {
                self.deadline = deadline;
                DeadlineUpdate::Moved(deadline)
            }
            None => {
                warn!(
                    "Ignoring disconnect hint {} from {}: deadline out of range",
                    reply.disconnect, self.endpoint
                );
                DeadlineUpdate::Unchanged
            }
        }
    }

    /// True once `now` has reached the soft deadline
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }
}
