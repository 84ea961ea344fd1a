use std::path::PathBuf;

use snafu::{Location, Snafu};

use mymoment::config::ConfigError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ApplicationError {
    /// could not load the configuration
    #[snafu(display("could not load the configuration: {source}"))]
    ConfigLoad {
        source: ConfigError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not initialize the logger
    #[snafu(display("could not initialize the logger: {source}"))]
    InitializeLogger {
        source: tracing::subscriber::SetGlobalDefaultError,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not read an input file
    #[snafu(display("could not read `{}`: {source}", path.display()))]
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// An input file is not the JSON we expected
    #[snafu(display("`{}` is not valid input: {source}", path.display()))]
    ParseInput {
        path: PathBuf,
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },

    /// Could not write the result
    #[snafu(display("could not write the output: {source}"))]
    WriteOutput {
        source: serde_json::Error,
        #[snafu(implicit)]
        location: Location,
    },
}
