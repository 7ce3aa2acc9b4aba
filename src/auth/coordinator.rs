// Refresh coordination
// Single-flight gate for the refresh-token exchange. The first unauthorized
// request becomes the leader and performs the exchange; later failures wait
// on a broadcast of the outcome; a cooldown window rejects new attempts too
// soon after the previous one started. An in-flight refresh wins over the
// cooldown check: waiters queue behind it instead of failing fast.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::Instant;

/// Outcome of one refresh cycle, broadcast to every waiter
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// Exchange succeeded; waiters replay their request with this token
    Renewed(String),
    /// Exchange failed; waiters propagate their original error
    Failed { rate_limited: bool },
}

/// What a request that hit an unauthorized response should do next
pub enum RefreshTicket<'a> {
    /// Caller owns the exchange and must publish the outcome via the permit
    Leader(RefreshPermit<'a>),
    /// A refresh is already in flight; await the broadcast
    Follower(broadcast::Receiver<RefreshOutcome>),
    /// No refresh in flight but the cooldown window is still open
    Cooldown { retry_after: Duration },
}

struct RefreshState {
    in_flight: Option<broadcast::Sender<RefreshOutcome>>,
    last_attempt: Option<Instant>,
}

/// Serializes refresh attempts across concurrent requests
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    cooldown: Duration,
}

impl RefreshCoordinator {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(RefreshState {
                in_flight: None,
                last_attempt: None,
            }),
            cooldown,
        }
    }

    /// Join the refresh flow after an unauthorized response.
    ///
    /// Exactly one caller per cycle gets a `Leader` permit; the decision and
    /// the state mutation happen atomically under the lock.
    pub fn join(&self) -> RefreshTicket<'_> {
        let mut state = self.lock();

        if let Some(sender) = &state.in_flight {
            return RefreshTicket::Follower(sender.subscribe());
        }

        if let Some(last) = state.last_attempt {
            let elapsed = last.elapsed();
            if elapsed < self.cooldown {
                return RefreshTicket::Cooldown {
                    retry_after: self.cooldown - elapsed,
                };
            }
        }

        // Only one message is ever sent per cycle
        let (sender, _) = broadcast::channel(1);
        state.in_flight = Some(sender);
        state.last_attempt = Some(Instant::now());

        RefreshTicket::Leader(RefreshPermit {
            coordinator: self,
            published: false,
        })
    }

    /// Fail any in-flight cycle, e.g. when the surrounding session ends.
    /// Waiters resume and propagate their original errors.
    pub fn abort_pending(&self) {
        self.publish(RefreshOutcome::Failed {
            rate_limited: false,
        });
    }

    pub fn is_refreshing(&self) -> bool {
        self.lock().in_flight.is_some()
    }

    fn publish(&self, outcome: RefreshOutcome) {
        let mut state = self.lock();
        if let Some(sender) = state.in_flight.take() {
            // Send fails only when no waiter subscribed
            let _ = sender.send(outcome);
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Held by the leader for the duration of the exchange.
///
/// Dropping the permit without completing publishes a failure, so waiters
/// are released instead of being left suspended.
pub struct RefreshPermit<'a> {
    coordinator: &'a RefreshCoordinator,
    published: bool,
}

impl RefreshPermit<'_> {
    /// Publish the outcome and close the cycle
    pub fn complete(mut self, outcome: RefreshOutcome) {
        self.published = true;
        self.coordinator.publish(outcome);
    }
}

impl Drop for RefreshPermit<'_> {
    fn drop(&mut self) {
        if !self.published {
            tracing::warn!("refresh permit dropped without an outcome, failing waiters");
            self.coordinator.publish(RefreshOutcome::Failed {
                rate_limited: false,
            });
        }
    }
}
