//! Latest-wins request lifecycle shared by the list and detail controllers.
//!
//! One mutex guards the epoch tracker, and every snapshot write happens
//! while that mutex is held. A resolution therefore either sees its epoch as
//! current and publishes, or sees a newer epoch and publishes nothing; there
//! is no window where a stale outcome can slip in after a newer `begin`.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use crate::epoch::{EpochTracker, RequestTicket};
use crate::fetch::{FetchError, FetchOutcome};

#[derive(Debug, Default)]
struct LifecycleState {
    epochs: EpochTracker,
    disposed: bool,
}

/// Epoch-guarded owner of one observable snapshot `S`.
#[derive(Debug)]
pub(crate) struct RequestLifecycle<S> {
    state: Mutex<LifecycleState>,
    snapshot: watch::Sender<S>,
}

impl<S> RequestLifecycle<S> {
    pub(crate) fn new(initial: S) -> Self {
        let (snapshot, _rx) = watch::channel(initial);
        Self {
            state: Mutex::new(LifecycleState::default()),
            snapshot,
        }
    }

    /// Starts a new epoch and applies `start` to the snapshot before
    /// returning. Returns `None` once disposed.
    pub(crate) fn begin(&self, start: impl FnOnce(&mut S)) -> Option<RequestTicket> {
        let mut state = self.state.lock();
        if state.disposed {
            return None;
        }
        let ticket = state.epochs.begin();
        self.snapshot.send_modify(start);
        Some(ticket)
    }

    /// Supersedes any outstanding request without issuing a new one, then
    /// applies `change`. Used for outcomes known without a fetch.
    pub(crate) fn supersede(&self, change: impl FnOnce(&mut S)) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }
        state.epochs.invalidate();
        self.snapshot.send_modify(change);
    }

    /// Applies the outcome of the request issued under `epoch`, if that
    /// epoch is still current. Returns whether `apply` ran.
    ///
    /// An aborted outcome is never applied. If its epoch is still current
    /// the fetcher gave up on its own, so `settle` clears the loading state
    /// and publishes only if it reports a change.
    pub(crate) fn resolve<T>(
        &self,
        epoch: u64,
        outcome: FetchOutcome<T>,
        apply: impl FnOnce(&mut S, Result<T, FetchError>),
        settle: impl FnOnce(&mut S) -> bool,
    ) -> bool {
        let mut state = self.state.lock();
        if !state.epochs.is_current(epoch) {
            debug!(epoch, "discarding outcome of superseded request");
            return false;
        }
        state.epochs.resolve(epoch);
        let result = match outcome {
            FetchOutcome::Success(value) => Ok(value),
            FetchOutcome::Failure(err) => Err(err),
            FetchOutcome::Aborted => {
                debug!(epoch, "current request aborted by fetcher");
                self.snapshot.send_if_modified(settle);
                return false;
            }
        };
        self.snapshot.send_modify(|snapshot| apply(snapshot, result));
        true
    }

    /// Cancels the outstanding request and refuses new ones. Safe to call
    /// repeatedly; `settle` only runs on the first call and publishes only
    /// if it reports a change.
    pub(crate) fn dispose(&self, settle: impl FnOnce(&mut S) -> bool) {
        let mut state = self.state.lock();
        if state.disposed {
            return;
        }
        state.disposed = true;
        if state.epochs.invalidate() {
            debug!("cancelled outstanding request on dispose");
        }
        self.snapshot.send_if_modified(settle);
    }

    pub(crate) fn is_disposed(&self) -> bool {
        self.state.lock().disposed
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<S> {
        self.snapshot.subscribe()
    }
}

impl<S: Clone> RequestLifecycle<S> {
    pub(crate) fn current(&self) -> S {
        self.snapshot.borrow().clone()
    }
}
