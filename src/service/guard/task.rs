use std::sync::Arc;
use std::time::Duration;

use tokio::select;
use tokio::sync::{oneshot, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::{GuardSnapshot, PlaybackGuard, Player, SessionId};

/// `interval_at` panics on a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A background task polling one player on a fixed period.
///
/// Snapshots are published on a watch channel whenever they change.
#[derive(Debug)]
pub struct GuardTask {
    stop: oneshot::Sender<()>,
    handle: tokio::task::JoinHandle<PlaybackGuard>,
    snapshots: watch::Receiver<GuardSnapshot>,
}

impl GuardTask {
    pub fn spawn(
        session: SessionId, mut guard: PlaybackGuard, player: Option<Arc<dyn Player>>,
    ) -> Self {
        let (stop, mut signal) = oneshot::channel();
        let (publisher, snapshots) = watch::channel(guard.snapshot());

        let period = guard.config().poll_interval.max(MIN_PERIOD);

        let handle = tokio::spawn(async move {
            // like setInterval, the first poll happens one period in
            let mut timer = interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            tracing::debug!(%session, ?period, "started playback guard");

            loop {
                select! {
                    biased;

                    _ = &mut signal => {
                        tracing::debug!(%session, "stopped playback guard");
                        break;
                    }

                    _ = timer.tick() => {
                        match guard.tick(player.as_deref()) {
                            Ok(outcome) => tracing::trace!(%session, ?outcome, "playback guard ticked"),
                            Err(error) => {
                                tracing::warn!(%session, %error, "playback guard polling error");
                                continue;
                            }
                        }

                        let snapshot = guard.snapshot();
                        publisher.send_if_modified(|current| {
                            let changed = *current != snapshot;
                            *current = snapshot;
                            changed
                        });
                    }
                }
            }

            guard
        });

        Self {
            stop,
            handle,
            snapshots,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<GuardSnapshot> {
        self.snapshots.clone()
    }

    pub fn snapshot(&self) -> GuardSnapshot {
        *self.snapshots.borrow()
    }

    /// Stop polling and hand back the guard state. Once this returns the timer is gone.
    ///
    /// `None` only if the task panicked.
    pub async fn stop(self) -> Option<PlaybackGuard> {
        let _ = self.stop.send(());
        self.handle.await.ok()
    }
}
