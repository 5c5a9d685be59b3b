//! Module errors
use thiserror::Error;

/// Represents the different types of errors that can occur while sampling.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// A sensor source could not be subscribed (missing hardware, app not measuring, no runtime...).
    #[error("sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// A source of the wrong kind was plugged where another one was expected.
    #[error("expected {expected} source, found {found}")]
    SensorMismatch { expected: String, found: String },

    /// Operation requires the session to be out of the Collecting state.
    #[error("session is still collecting")]
    StillCollecting,

    /// Upload requested without any accelerometer sample buffered.
    #[error("no samples to upload")]
    NothingToUpload,

    /// Sampling was started outside of a tokio runtime.
    #[error("no async runtime: {0}")]
    Runtime(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error indicating that there was an issue building the client.
    #[error("could not build http client: {0}")]
    ClientBuild(String),

    /// Error indicating that there was an issue fetching data.
    #[error("could not fetch data: {0}")]
    FetchData(String),

    /// Error indicating that the received data format is incorrect.
    #[error("incorrect data format: {0}")]
    IncorrectDataFormat(String),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),

    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Failure of a single upload attempt. None of them is retried.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The server answered with a non-2xx status.
    #[error("server rejected upload with status {status}: {body}")]
    Rejected {
        status: u16,
        body: String,
        headers: Vec<(String, String)>,
    },

    /// The request went out but no response came back.
    #[error("no response from server: {0}")]
    Unreachable(String),

    /// The request could not be built or sent at all.
    #[error("upload request could not be sent: {0}")]
    Request(String),
}
