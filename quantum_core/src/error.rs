//! Error type shared by the protocol session, the sample sources and the scheduler.

use std::time::Duration;

use reqwest::StatusCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Opening the serial device failed.
    #[error("failed to open serial device {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: tokio_serial::Error,
    },

    /// A write to (or read from) the open transport failed.
    #[error("transport i/o failed: {0}")]
    Transport(#[from] std::io::Error),

    #[error("remote request to {url} timed out")]
    RemoteTimeout { url: String },

    /// Non-success, non-5xx answer from the remote endpoint.
    #[error("remote {url} answered HTTP {status}")]
    RemoteStatus { url: String, status: StatusCode },

    #[error("remote request failed: {0}")]
    Remote(#[source] reqwest::Error),

    #[error("device did not identify within {0:?}")]
    IdentifyTimeout(Duration),

    #[error("device closed the link before identifying")]
    IdentifyEof,
}
