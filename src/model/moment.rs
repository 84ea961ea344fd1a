use snafu::{ensure, Snafu};

use super::*;

macro_rules! define_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, new)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                Ok(Self(input.to_string()))
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_key! {
    /// Opaque identity of a single moment.
    MomentId
}

define_key! {
    /// The media item (video or track) a moment points into.
    SourceId
}

define_key! {
    /// Explicit key that ties several moments into one cluster.
    GroupId
}

/// A user authored time range over a media source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    pub id: MomentId,
    pub source_id: SourceId,
    pub start_sec: f64,
    pub end_sec: f64,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

impl Moment {
    pub fn new(
        id: impl Into<MomentId>, source_id: impl Into<SourceId>, start_sec: f64, end_sec: f64,
    ) -> Result<Self, MomentError> {
        ensure!(
            start_sec.is_finite() && end_sec.is_finite(),
            NonFiniteSnafu { start_sec, end_sec }
        );
        ensure!(start_sec >= 0.0, NegativeStartSnafu { start_sec });
        ensure!(start_sec <= end_sec, StartAfterEndSnafu { start_sec, end_sec });

        Ok(Self {
            id: id.into(),
            source_id: source_id.into(),
            start_sec,
            end_sec,
            group_id: None,
            note: None,
            author: None,
        })
    }

    pub fn with_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// The moment's range. Deserialized moments skip [Moment::new], so a reversed
    /// range is clamped here instead of rejected.
    pub fn range(&self) -> TimeRange {
        TimeRange::normalized(self.start_sec, self.end_sec)
    }

    pub fn duration(&self) -> f64 {
        self.range().len()
    }

    pub fn is_instant(&self) -> bool {
        self.range().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Snafu)]
pub enum MomentError {
    #[snafu(display("moment offsets must be finite, got {start_sec}..{end_sec}"))]
    NonFinite { start_sec: f64, end_sec: f64 },

    #[snafu(display("moment cannot start before the media does, got {start_sec}"))]
    NegativeStart { start_sec: f64 },

    #[snafu(display("moment start {start_sec} is after its end {end_sec}"))]
    StartAfterEnd { start_sec: f64, end_sec: f64 },
}
