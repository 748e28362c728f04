//! Request epochs: the latest-wins sequencing shared by both controllers.

use tokio_util::sync::CancellationToken;

/// Handle for one issued request: its epoch and the token the fetch
/// collaborator watches.
#[derive(Debug, Clone)]
pub(crate) struct RequestTicket {
    pub(crate) epoch: u64,
    pub(crate) cancel: CancellationToken,
}

/// Tracks the most recent epoch and the cancellation token of the request
/// issued under it.
///
/// Not synchronized on its own; controllers keep it behind the same lock as
/// the snapshot it guards.
#[derive(Debug, Default)]
pub(crate) struct EpochTracker {
    current: u64,
    in_flight: Option<CancellationToken>,
}

impl EpochTracker {
    /// Starts a new epoch, cancelling the request of the previous one.
    pub(crate) fn begin(&mut self) -> RequestTicket {
        self.cancel_in_flight();
        self.current = self.current.wrapping_add(1);
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        RequestTicket {
            epoch: self.current,
            cancel,
        }
    }

    /// Whether `epoch` is still the latest one.
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        self.current == epoch
    }

    /// Marks `epoch` resolved so its token is not cancelled later.
    pub(crate) fn resolve(&mut self, epoch: u64) {
        if self.is_current(epoch) {
            self.in_flight = None;
        }
    }

    /// Cancels any outstanding request and moves past its epoch, so its
    /// result is dropped even if the collaborator ignores the token.
    /// Returns whether a request was outstanding.
    pub(crate) fn invalidate(&mut self) -> bool {
        let had_request = self.cancel_in_flight();
        self.current = self.current.wrapping_add(1);
        had_request
    }

    fn cancel_in_flight(&mut self) -> bool {
        match self.in_flight.take() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }
}
