use super::*;

/// A closed interval of media time, in seconds.
///
/// `start <= end` always holds for ranges built through [TimeRange::normalized].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, new)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    /// Build a range, clamping `end` up to `start` when the two are swapped.
    pub fn normalized(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn point(at: f64) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    pub fn contains(&self, other: &TimeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_time(&self, at: f64) -> bool {
        self.start <= at && at <= self.end
    }

    /// Position of this range as fractions of `duration`, clamped into `[0, 1]`.
    pub fn fraction_of(&self, duration: f64) -> (f64, f64) {
        if duration <= 0.0 {
            return (0.0, 0.0);
        }

        let fraction = |t: f64| (t / duration).clamp(0.0, 1.0);
        (fraction(self.start), fraction(self.end))
    }
}
