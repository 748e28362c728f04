//! Serving state of the catalog API and request draining on shutdown.
//!
//! Health and the in-flight request count are both `watch` channels: health checks
//! read the current value, and [`DrainState::drain`] waits for the count to
//! reach zero instead of polling it.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

/// `Starting -> Ready -> Draining -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Catalog loaded, listener not yet serving.
    Starting,
    Ready,
    /// Shutdown signalled; catalog requests already accepted still finish.
    Draining,
    Stopped,
}

/// Tracks whether the API is serving and how many catalog requests are
/// still running.
#[derive(Debug)]
pub struct DrainState {
    health: watch::Sender<HealthState>,
    in_flight: Arc<watch::Sender<u64>>,
}

impl DrainState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            health: watch::Sender::new(HealthState::Starting),
            in_flight: Arc::new(watch::Sender::new(0)),
        }
    }

    pub fn mark_ready(&self) {
        self.health.send_replace(HealthState::Ready);
    }

    /// Moves to `Draining` unless already stopped.
    pub fn begin_drain(&self) {
        self.health.send_if_modified(|state| {
            if matches!(state, HealthState::Starting | HealthState::Ready) {
                *state = HealthState::Draining;
                true
            } else {
                false
            }
        });
    }

    #[must_use]
    pub fn health(&self) -> HealthState {
        *self.health.borrow()
    }

    /// Receiver notified on every health transition.
    #[must_use]
    pub fn watch_health(&self) -> watch::Receiver<HealthState> {
        self.health.subscribe()
    }

    /// Counts one catalog request until the guard drops.
    #[must_use]
    pub fn track_request(&self) -> RequestGuard {
        self.in_flight.send_modify(|count| *count += 1);
        RequestGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn in_flight(&self) -> u64 {
        *self.in_flight.borrow()
    }

    /// Waits up to `timeout` for tracked requests to finish.
    ///
    /// On success the state becomes `Stopped` and `true` is returned; on
    /// timeout the state stays as it was.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let mut count = self.in_flight.subscribe();
        let finished = tokio::time::timeout(timeout, count.wait_for(|n| *n == 0))
            .await
            .is_ok_and(|waited| waited.is_ok());
        if finished {
            self.health.send_replace(HealthState::Stopped);
        } else {
            debug!(in_flight = self.in_flight(), "drain timed out");
        }
        finished
    }
}

impl Default for DrainState {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks one catalog request as running. Dropping it, also while unwinding,
/// releases the count.
#[derive(Debug)]
pub struct RequestGuard {
    in_flight: Arc<watch::Sender<u64>>,
}

impl Drop for RequestGuard {
    fn drop(&mut self) {
        self.in_flight.send_modify(|count| *count = count.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_in_starting_with_nothing_in_flight() {
        let drain = DrainState::new();
        assert_eq!(drain.health(), HealthState::Starting);
        assert_eq!(drain.in_flight(), 0);
    }

    #[test]
    fn health_serializes_lowercase() {
        let names: Vec<_> = [
            HealthState::Starting,
            HealthState::Ready,
            HealthState::Draining,
            HealthState::Stopped,
        ]
        .iter()
        .map(|s| serde_json::to_value(s).unwrap())
        .collect();
        assert_eq!(names, ["starting", "ready", "draining", "stopped"]);
    }

    #[test]
    fn begin_drain_never_revives_a_stopped_server() {
        let drain = DrainState::new();
        drain.mark_ready();
        drain.begin_drain();
        assert_eq!(drain.health(), HealthState::Draining);

        drain.health.send_replace(HealthState::Stopped);
        drain.begin_drain();
        assert_eq!(drain.health(), HealthState::Stopped);
    }

    #[test]
    fn guards_count_requests() {
        let drain = DrainState::new();
        let first = drain.track_request();
        let second = drain.track_request();
        assert_eq!(drain.in_flight(), 2);

        drop(first);
        assert_eq!(drain.in_flight(), 1);
        drop(second);
        assert_eq!(drain.in_flight(), 0);
    }

    #[tokio::test]
    async fn health_watchers_see_drain() {
        let drain = DrainState::new();
        let mut rx = drain.watch_health();
        drain.mark_ready();
        drain.begin_drain();

        rx.wait_for(|s| *s == HealthState::Draining).await.unwrap();
    }

    #[tokio::test]
    async fn idle_server_drains_at_once() {
        let drain = DrainState::new();
        drain.begin_drain();

        assert!(drain.drain(Duration::from_secs(1)).await);
        assert_eq!(drain.health(), HealthState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn drain_waits_for_running_request() {
        let drain = DrainState::new();
        let guard = drain.track_request();
        drain.begin_drain();

        let request = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(guard);
        });

        assert!(drain.drain(Duration::from_secs(2)).await);
        assert_eq!(drain.health(), HealthState::Stopped);
        request.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn drain_gives_up_after_timeout() {
        let drain = DrainState::new();
        let _guard = drain.track_request();
        drain.begin_drain();

        assert!(!drain.drain(Duration::from_millis(50)).await);
        assert_eq!(drain.health(), HealthState::Draining);
    }
}
