//! Ad detection for embedded video players.
//!
//! Third-party players may play an advertisement before or during the
//! requested video. An ad reports its own duration, so comparing the player's
//! duration against the known content duration tells the two apart. The
//! [PlaybackGuard] turns raw player readings into "believable" time and
//! duration values, and holds back a pending seek until content is confirmed.
//!
//! The guard itself is a plain state machine advanced by [PlaybackGuard::tick].
//! [GuardTask] drives it from a tokio timer and [GuardManager] keeps one task
//! per player session.

use std::time::Duration;

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::media::parse_start_param;

pub use manager::*;
pub use player::*;
pub use replay::*;
pub use task::*;

mod manager;
mod player;
mod replay;
mod task;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    AdPlaying,
    ContentPlaying,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GuardConfig {
    /// How often the player is polled.
    pub poll_interval: Duration,
    /// Largest duration difference, in seconds, still considered content.
    pub tolerance_secs: f64,
    /// Consecutive matching polls needed before content is trusted.
    pub stable_ticks: u32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            tolerance_secs: 2.0,
            stable_ticks: 3,
        }
    }
}

/// Caller supplied inputs of a guard, everything that may change over a session.
#[derive(Debug, Clone, PartialEq, new)]
pub struct GuardOptions {
    /// Known duration of the content. `0` makes every non-zero reading look like an ad.
    pub expected_duration: f64,
    #[new(default)]
    pub start_param: Option<String>,
    #[new(value = "true")]
    pub enabled: bool,
    /// Replaces the live duration reading, for exercising the guard by hand.
    #[new(default)]
    pub forced_player_duration: Option<f64>,
}

impl GuardOptions {
    pub fn with_start_param(mut self, start: impl Into<String>) -> Self {
        self.start_param = Some(start.into());
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_forced_player_duration(mut self, duration: f64) -> Self {
        self.forced_player_duration = Some(duration);
        self
    }
}

/// What the rest of the application gets to see.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardSnapshot {
    pub current_time: f64,
    pub duration: f64,
    pub is_ad: bool,
    pub playback_state: PlaybackState,
    pub controls_disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TickOutcome {
    /// Guard disabled or no player: raw values were passed through.
    Bypassed,
    /// The player reported a zero duration; nothing changed.
    Loading,
    Ad,
    /// Duration matched, but not for long enough yet.
    Candidate { matches: u32 },
    /// Content confirmed, possibly after performing the queued seek.
    Content { sought: Option<u32> },
}

#[derive(Debug, Clone)]
pub struct PlaybackGuard {
    config: GuardConfig,
    options: GuardOptions,

    state: PlaybackState,
    current_time: f64,
    duration: f64,
    is_ad: bool,
    queued_seek: Option<u32>,
    consecutive_matches: u32,
}

impl PlaybackGuard {
    pub fn new(options: GuardOptions, config: GuardConfig) -> Self {
        let queued_seek = options.start_param.as_deref().and_then(parse_start_param);

        Self {
            config,
            state: PlaybackState::Idle,
            current_time: 0.0,
            duration: options.expected_duration.max(0.0),
            is_ad: false,
            queued_seek,
            consecutive_matches: 0,
            options,
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn options(&self) -> &GuardOptions {
        &self.options
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn queued_seek(&self) -> Option<u32> {
        self.queued_seek
    }

    pub fn consecutive_matches(&self) -> u32 {
        self.consecutive_matches
    }

    pub fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            current_time: self.current_time,
            duration: self.duration,
            is_ad: self.is_ad,
            playback_state: self.state,
            controls_disabled: self.options.enabled && self.is_ad,
        }
    }

    /// Swap in new options, as when the expected duration becomes known or the
    /// guard gets toggled. A pending seek survives; a new start parameter replaces it.
    pub fn reconfigure(&mut self, options: GuardOptions) {
        if options.start_param != self.options.start_param {
            if let Some(seek) = options.start_param.as_deref().and_then(parse_start_param) {
                self.queued_seek = Some(seek);
            }
        }

        if !options.enabled {
            self.is_ad = false;
        }

        self.consecutive_matches = 0;
        self.options = options;
    }

    /// Advance the guard by one poll.
    ///
    /// Every player call happens before any field is written, so an error leaves
    /// the guard exactly as it was.
    pub fn tick(&mut self, player: Option<&dyn Player>) -> Result<TickOutcome, PlayerError> {
        let player = match player {
            Some(player) if self.options.enabled => player,
            player => return self.bypass(player),
        };

        let expected = self.options.expected_duration;
        let player_duration = match self.options.forced_player_duration {
            Some(forced) => forced,
            None => player.duration()?,
        };

        // zero is what players report while still loading, not an ad signal
        if player_duration == 0.0 || !player_duration.is_finite() {
            return Ok(TickOutcome::Loading);
        }

        let delta = (player_duration - expected).abs();

        if delta > self.config.tolerance_secs {
            if self.state != PlaybackState::AdPlaying {
                tracing::debug!(player_duration, expected, delta, "ad detected");
            }

            self.is_ad = true;
            self.state = PlaybackState::AdPlaying;
            self.duration = expected;
            self.consecutive_matches = 0;
            return Ok(TickOutcome::Ad);
        }

        let matches = self.consecutive_matches.saturating_add(1);
        if matches < self.config.stable_ticks {
            self.consecutive_matches = matches;
            return Ok(TickOutcome::Candidate { matches });
        }

        let current_time = whole_seconds(player.current_time()?);

        let sought = match self.queued_seek {
            Some(seek) => {
                player.seek_to(f64::from(seek))?;
                tracing::debug!(seek, "performed queued seek");
                Some(seek)
            }
            None => None,
        };

        if self.state != PlaybackState::ContentPlaying {
            tracing::debug!(player_duration, expected, matches, "content confirmed");
        }

        self.consecutive_matches = matches;
        self.is_ad = false;
        self.state = PlaybackState::ContentPlaying;
        self.current_time = current_time;
        self.duration = expected;
        self.queued_seek = None;

        Ok(TickOutcome::Content { sought })
    }

    fn bypass(&mut self, player: Option<&dyn Player>) -> Result<TickOutcome, PlayerError> {
        if let Some(player) = player {
            let current_time = whole_seconds(player.current_time()?);
            let duration = whole_seconds(player.duration()?);

            self.current_time = current_time;
            self.duration = if duration > 0.0 {
                duration
            } else {
                self.options.expected_duration
            };
        }

        self.is_ad = false;
        self.state = PlaybackState::Idle;
        Ok(TickOutcome::Bypassed)
    }
}

fn whole_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.floor().max(0.0)
    } else {
        0.0
    }
}
