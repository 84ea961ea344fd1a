use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::{GuardSnapshot, PlaybackGuard, Player, PlayerError, TickOutcome};

/// One recorded poll of a real player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub current_time: f64,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayStep {
    pub tick: usize,
    pub reading: Reading,
    pub outcome: TickOutcome,
    pub snapshot: GuardSnapshot,
}

/// Feed recorded readings through `guard`, one tick per reading.
pub fn replay(guard: &mut PlaybackGuard, readings: &[Reading]) -> Vec<ReplayStep> {
    readings
        .iter()
        .enumerate()
        .filter_map(|(tick, &reading)| {
            let player = RecordedPlayer::new(reading);

            match guard.tick(Some(&player)) {
                Ok(outcome) => Some(ReplayStep {
                    tick,
                    reading,
                    outcome,
                    snapshot: guard.snapshot(),
                }),
                Err(error) => {
                    tracing::warn!(tick, %error, "recorded reading rejected");
                    None
                }
            }
        })
        .collect()
}

#[derive(Debug)]
struct RecordedPlayer {
    reading: Mutex<Reading>,
}

impl RecordedPlayer {
    fn new(reading: Reading) -> Self {
        Self {
            reading: Mutex::new(reading),
        }
    }

    fn read(&self) -> Result<Reading, PlayerError> {
        self.reading
            .lock()
            .map(|reading| *reading)
            .map_err(|_| PlayerError::NotReady)
    }
}

impl Player for RecordedPlayer {
    fn current_time(&self) -> Result<f64, PlayerError> {
        Ok(self.read()?.current_time)
    }

    fn duration(&self) -> Result<f64, PlayerError> {
        Ok(self.read()?.duration)
    }

    fn seek_to(&self, seconds: f64) -> Result<(), PlayerError> {
        let mut reading = self.reading.lock().map_err(|_| PlayerError::NotReady)?;
        reading.current_time = seconds;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{GuardConfig, GuardOptions, PlaybackState};
    use super::*;

    fn reading(current_time: f64, duration: f64) -> Reading {
        Reading {
            current_time,
            duration,
        }
    }

    #[test]
    fn replays_ad_then_content() {
        let mut guard = PlaybackGuard::new(
            GuardOptions::new(200.0).with_start_param("45"),
            GuardConfig::default(),
        );
        let readings = [
            reading(0.0, 0.0),
            reading(3.0, 15.0),
            reading(14.0, 15.0),
            reading(0.0, 200.4),
            reading(0.5, 200.4),
            reading(0.9, 200.4),
            reading(46.0, 200.4),
        ];

        let steps = replay(&mut guard, &readings);
        let outcomes: Vec<TickOutcome> = steps.iter().map(|s| s.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Loading,
                TickOutcome::Ad,
                TickOutcome::Ad,
                TickOutcome::Candidate { matches: 1 },
                TickOutcome::Candidate { matches: 2 },
                TickOutcome::Content { sought: Some(45) },
                TickOutcome::Content { sought: None },
            ]
        );

        let last = steps.last().unwrap().snapshot;
        assert_eq!(last.playback_state, PlaybackState::ContentPlaying);
        assert_eq!(last.current_time, 46.0);
        assert_eq!(last.duration, 200.0);
    }
}
