use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer};
use snafu::{ensure, Location, ResultExt, Snafu};

use crate::service::guard::GuardConfig;

/// Every field can be set through a `MYMOMENT_`-prefixed environment variable.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_log_dir")]
    pub log_dir: PathBuf,

    /// Accepts humantime strings such as `100ms` or `1s`.
    #[serde(
        default = "Config::default_poll_interval",
        deserialize_with = "Config::duration"
    )]
    pub poll_interval: Duration,

    #[serde(default = "Config::default_ad_tolerance")]
    pub ad_tolerance_secs: f64,

    #[serde(default = "Config::default_stable_ticks")]
    pub stable_ticks: u32,
}

impl Config {
    pub const PREFIX: &'static str = "MYMOMENT_";

    pub fn from_env() -> Result<Config, ConfigError> {
        envy::prefixed(Self::PREFIX)
            .from_env::<Config>()
            .context(LoadSnafu)?
            .validated()
    }

    pub fn from_vars(
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Config, ConfigError> {
        envy::prefixed(Self::PREFIX)
            .from_iter::<_, Config>(vars)
            .context(LoadSnafu)?
            .validated()
    }

    /// The timer needs a non-zero period and ad detection a finite tolerance.
    fn validated(self) -> Result<Config, ConfigError> {
        ensure!(!self.poll_interval.is_zero(), ZeroPollIntervalSnafu);
        ensure!(
            self.ad_tolerance_secs.is_finite() && self.ad_tolerance_secs >= 0.0,
            InvalidToleranceSnafu {
                value: self.ad_tolerance_secs
            }
        );

        Ok(self)
    }

    pub fn guard(&self) -> GuardConfig {
        GuardConfig {
            poll_interval: self.poll_interval,
            tolerance_secs: self.ad_tolerance_secs,
            stable_ticks: self.stable_ticks.max(1),
        }
    }

    fn default_log_dir() -> PathBuf {
        PathBuf::from("logs")
    }

    fn default_poll_interval() -> Duration {
        GuardConfig::default().poll_interval
    }

    fn default_ad_tolerance() -> f64 {
        GuardConfig::default().tolerance_secs
    }

    fn default_stable_ticks() -> u32 {
        GuardConfig::default().stable_ticks
    }

    fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        humantime::parse_duration(&text).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("could not read configuration from the environment: {source}"))]
    Load {
        source: envy::Error,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("poll interval must be greater than zero"))]
    ZeroPollInterval {
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("ad tolerance must be a non-negative number of seconds, got {value}"))]
    InvalidTolerance {
        value: f64,
        #[snafu(implicit)]
        location: Location,
    },
}
