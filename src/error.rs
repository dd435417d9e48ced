//! Error handling for watchdogd.
use thiserror::Error;

/// Defines all possible errors that can occur while supervising the service.
///
/// Probe failures are deliberately absent: an unreachable service is an
/// expected condition the supervisor recovers from, not an error that should
/// abort supervision. See [`ProbeError`] for those.
#[derive(Debug, Error)]
pub enum WatchdogError {
    /// Error spawning the supervised service process.
    #[error("Failed to spawn service command `{command}`: {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error delivering a signal to the supervised process.
    #[error("Failed to signal service process {pid}: {source}")]
    Signal {
        /// The process the signal was addressed to.
        pid: u32,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// Error while blocking on the supervised process's termination.
    #[error("Failed to wait for service process {pid}: {source}")]
    Wait {
        /// The process being waited on.
        pid: u32,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },
}

/// Error type for health probe round trips.
///
/// Every variant is recoverable: the supervisor turns any of these into an
/// "unhealthy" verdict and restarts the service.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Error connecting to the probed endpoint.
    #[error("Connection failed: {0}")]
    Connect(#[from] std::io::Error),

    /// Error building or sending the HTTP probe request.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered but reported an unhealthy status.
    #[error("Service responded with HTTP {0}")]
    Unhealthy(reqwest::StatusCode),
}
