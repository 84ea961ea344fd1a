use snafu::Snafu;

/// The narrow slice of an embedded video player the guard needs.
///
/// Times are in seconds and may be fractional.
pub trait Player: Send + Sync {
    fn current_time(&self) -> Result<f64, PlayerError>;
    fn duration(&self) -> Result<f64, PlayerError>;
    fn seek_to(&self, seconds: f64) -> Result<(), PlayerError>;
}

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum PlayerError {
    #[snafu(display("player is not ready yet"))]
    NotReady,

    #[snafu(display("player call `{call}` failed: {message}"))]
    Call { call: &'static str, message: String },
}

#[cfg(test)]
pub(crate) mod fake {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Scriptable player that records every seek and counts duration reads.
    #[derive(Debug, Default)]
    pub struct FakePlayer {
        state: Mutex<FakeState>,
        reads: AtomicUsize,
    }

    #[derive(Debug, Default)]
    struct FakeState {
        duration: f64,
        current_time: f64,
        failing: bool,
        seeks: Vec<f64>,
    }

    impl FakePlayer {
        pub fn new(duration: f64, current_time: f64) -> Self {
            let player = Self::default();
            player.set(duration, current_time);
            player
        }

        pub fn set(&self, duration: f64, current_time: f64) {
            let mut state = self.state.lock().unwrap();
            state.duration = duration;
            state.current_time = current_time;
        }

        pub fn set_failing(&self, failing: bool) {
            self.state.lock().unwrap().failing = failing;
        }

        pub fn seeks(&self) -> Vec<f64> {
            self.state.lock().unwrap().seeks.clone()
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn check(&self, call: &'static str) -> Result<(), PlayerError> {
            if self.state.lock().unwrap().failing {
                return CallSnafu {
                    call,
                    message: "player went away",
                }
                .fail();
            }
            Ok(())
        }
    }

    impl Player for FakePlayer {
        fn current_time(&self) -> Result<f64, PlayerError> {
            self.check("getCurrentTime")?;
            Ok(self.state.lock().unwrap().current_time)
        }

        fn duration(&self) -> Result<f64, PlayerError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.check("getDuration")?;
            Ok(self.state.lock().unwrap().duration)
        }

        fn seek_to(&self, seconds: f64) -> Result<(), PlayerError> {
            self.check("seekTo")?;
            let mut state = self.state.lock().unwrap();
            state.seeks.push(seconds);
            state.current_time = seconds;
            Ok(())
        }
    }
}
