//! Error types for each failure domain.
//!
//! None of these are fatal while the bot runs: probe errors become
//! [`SignalState::Unknown`](crate::signal::SignalState::Unknown), delivery
//! and persistence errors are logged and skipped, and receive-loop errors
//! restart the loop after a backoff. Only the CLI boundary turns them into
//! a failing exit code.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by the filesystem port.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failed attempt to read the signal endpoint.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request could not be sent or timed out.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Probed URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status {
        /// Probed URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The response body could not be read or was not UTF-8.
    #[error("unreadable body from {url}: {reason}")]
    Body {
        /// Probed URL.
        url: String,
        /// What went wrong.
        reason: String,
    },
}

/// A failure talking to the messaging channel, in either direction.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Network-level failure.
    #[error("channel request failed: {0}")]
    Transport(String),
    /// The platform rejected the call.
    #[error("channel rejected request ({code}): {description}")]
    Rejected {
        /// Platform error code.
        code: u16,
        /// Platform error description.
        description: String,
    },
    /// The call did not finish in time.
    #[error("channel request timed out after {0:?}")]
    Timeout(Duration),
    /// The platform answered with something we could not parse.
    #[error("could not decode channel response: {0}")]
    Decode(String),
}

/// A failure loading or saving the subscriber file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        /// Subscriber file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: BoxError,
    },
    /// The file exists but is not a JSON array of ids.
    #[error("failed to parse {}: {source}", .path.display())]
    Decode {
        /// Subscriber file path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// The in-memory set could not be serialized.
    #[error("failed to encode subscribers: {0}")]
    Encode(#[source] serde_json::Error),
    /// The file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Subscriber file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: BoxError,
    },
}

/// Invalid or incomplete configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: BoxError,
    },
    /// The config file is not valid JSON of the expected shape.
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },
    /// No bot token was supplied by any source.
    #[error("bot token missing: pass --token, set GRIDWATCH_BOT_TOKEN or add BOT_TOKEN to the config file")]
    MissingToken,
    /// The probe address is not an http(s) URL.
    #[error("probe url must start with http:// or https://, got {0:?}")]
    InvalidProbeUrl(String),
    /// An HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Top-level error surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration problem.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Subscriber file problem.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    /// The async runtime could not be set up.
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// A one-off probe came back `Unknown`.
    #[error("could not read signal from {0}")]
    SignalUnavailable(String),
}
