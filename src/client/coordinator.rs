//! Single-flight coordination of access-token refreshes.
//!
//! At most one refresh call is outstanding per coordinator. The first caller
//! that observes an expired token becomes the leader and performs the
//! refresh; everyone arriving while it runs follows and awaits the same
//! result. The slot is cleared as soon as the cycle ends, on every exit path
//! (success, failure, panic or the leader's future being dropped), so the
//! next expiry starts a fresh cycle.

use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

/// `None` until the leader publishes the refresh result.
type RefreshResult = Option<bool>;

#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    inflight: Mutex<Option<watch::Receiver<RefreshResult>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRole {
    /// Started the refresh call.
    Leader,
    /// Awaited a refresh started by someone else.
    Follower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub role: RefreshRole,
    pub refreshed: bool,
}

/// Handle on a refresh that is already in flight.
#[derive(Debug, Clone)]
pub struct PendingRefresh {
    rx: watch::Receiver<RefreshResult>,
}

impl PendingRefresh {
    /// Resolves once the leader publishes its result. A leader that goes
    /// away without publishing counts as a failed refresh.
    pub async fn wait(mut self) -> bool {
        match self.rx.wait_for(Option::is_some).await {
            Ok(result) => (*result).unwrap_or(false),
            Err(_) => false,
        }
    }
}

/// Proof of leadership for one refresh cycle. Dropping it ends the cycle.
#[derive(Debug)]
pub struct RefreshTicket<'a> {
    coordinator: &'a RefreshCoordinator,
    tx: watch::Sender<RefreshResult>,
}

impl RefreshTicket<'_> {
    /// Publish the result to all followers and end the cycle.
    pub fn complete(self, refreshed: bool) -> bool {
        self.tx.send_replace(Some(refreshed));
        refreshed
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        self.coordinator.clear();
    }
}

enum Turn<'a> {
    Lead(RefreshTicket<'a>),
    Follow(PendingRefresh),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_refreshing(&self) -> bool {
        self.slot().is_some()
    }

    /// Claim leadership of a new cycle. `None` when a refresh is already in
    /// flight; use [`current_refresh`](Self::current_refresh) to join it.
    pub fn start_refresh(&self) -> Option<RefreshTicket<'_>> {
        match self.join() {
            Turn::Lead(ticket) => Some(ticket),
            Turn::Follow(_) => None,
        }
    }

    pub fn current_refresh(&self) -> Option<PendingRefresh> {
        self.slot()
            .as_ref()
            .map(|rx| PendingRefresh { rx: rx.clone() })
    }

    /// Join the in-flight refresh, or lead a new one by running `refresh`.
    pub async fn run<F, Fut>(&self, refresh: F) -> RefreshOutcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        match self.join() {
            Turn::Lead(ticket) => {
                debug!("starting token refresh");
                let refreshed = ticket.complete(refresh().await);
                debug!(refreshed, "token refresh finished");
                RefreshOutcome {
                    role: RefreshRole::Leader,
                    refreshed,
                }
            }
            Turn::Follow(pending) => {
                debug!("awaiting in-flight token refresh");
                RefreshOutcome {
                    role: RefreshRole::Follower,
                    refreshed: pending.wait().await,
                }
            }
        }
    }

    // Check-and-claim happens under one lock so two callers can never both lead.
    fn join(&self) -> Turn<'_> {
        let mut slot = self.slot();
        if let Some(rx) = slot.as_ref() {
            return Turn::Follow(PendingRefresh { rx: rx.clone() });
        }

        let (tx, rx) = watch::channel(None);
        *slot = Some(rx);
        Turn::Lead(RefreshTicket {
            coordinator: self,
            tx,
        })
    }

    fn clear(&self) {
        *self.slot() = None;
    }

    fn slot(&self) -> MutexGuard<'_, Option<watch::Receiver<RefreshResult>>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
