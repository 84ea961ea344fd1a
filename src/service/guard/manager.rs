use std::sync::Arc;

use dashmap::DashMap;
use derive_new::new;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use snafu::{OptionExt as _, Snafu};
use tokio::sync::watch;
use tracing::instrument;

use super::{GuardConfig, GuardOptions, GuardSnapshot, GuardTask, PlaybackGuard, Player};

/// One mounted player, e.g. a browser tab showing a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
#[serde(transparent)]
pub struct SessionId(String);

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keeps one polling task per player session and restarts it when its inputs change.
#[derive(Debug, Clone, new)]
pub struct GuardManager {
    #[new(default)]
    sessions: Arc<DashMap<SessionId, GuardTask>>,
    config: GuardConfig,
}

impl GuardManager {
    /// Start guarding a session. An existing task for the same session is torn down first.
    #[instrument(skip(self, player))]
    pub async fn attach(
        &self, session: SessionId, player: Option<Arc<dyn Player>>, options: GuardOptions,
    ) -> watch::Receiver<GuardSnapshot> {
        if let Some((_id, existing)) = self.sessions.remove(&session) {
            tracing::info!(%session, "found an existing guard for the session, stopping it");
            existing.stop().await;
        }

        tracing::info!(%session, "attach playback guard");
        let guard = PlaybackGuard::new(options, self.config);
        self.start(session, guard, player)
    }

    /// Restart a session's timer with a new player or options, keeping its guard state.
    #[instrument(skip(self, player))]
    pub async fn update(
        &self, session: SessionId, player: Option<Arc<dyn Player>>, options: GuardOptions,
    ) -> Result<watch::Receiver<GuardSnapshot>, GuardError> {
        let (_id, task) = self
            .sessions
            .remove(&session)
            .context(UnknownSessionSnafu {
                session: session.clone(),
            })?;

        let guard = match task.stop().await {
            Some(mut guard) => {
                guard.reconfigure(options);
                guard
            }
            None => {
                tracing::warn!(%session, "previous guard task panicked, starting over");
                PlaybackGuard::new(options, self.config)
            }
        };

        tracing::info!(%session, "updated playback guard");
        Ok(self.start(session, guard, player))
    }

    /// Stop guarding a session, returning its last snapshot.
    #[instrument(skip(self))]
    pub async fn detach(&self, session: &SessionId) -> Option<GuardSnapshot> {
        let (_id, task) = self.sessions.remove(session)?;
        tracing::info!(%session, "detach playback guard");

        task.stop().await.map(|guard| guard.snapshot())
    }

    pub fn subscribe(&self, session: &SessionId) -> Option<watch::Receiver<GuardSnapshot>> {
        self.sessions.get(session).map(|task| task.subscribe())
    }

    pub fn snapshot(&self, session: &SessionId) -> Option<GuardSnapshot> {
        self.sessions.get(session).map(|task| task.snapshot())
    }

    pub fn sessions(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|x| x.key().clone()).collect_vec()
    }

    pub async fn shutdown(&self) {
        tracing::info!("stop all playback guards");

        for session in self.sessions() {
            self.detach(&session).await;
        }
    }

    fn start(
        &self, session: SessionId, guard: PlaybackGuard, player: Option<Arc<dyn Player>>,
    ) -> watch::Receiver<GuardSnapshot> {
        let task = GuardTask::spawn(session.clone(), guard, player);
        let snapshots = task.subscribe();
        self.sessions.insert(session, task);
        snapshots
    }
}

#[derive(Debug, Snafu)]
pub enum GuardError {
    #[snafu(display("no playback guard is attached to session `{session}`"))]
    UnknownSession { session: SessionId },
}
