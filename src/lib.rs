//! Watchdogd keeps a single long-running server process alive. It launches
//! the configured service command, probes the service over the network on a
//! fixed interval, and restarts the process whenever the probe fails or the
//! process has died, escalating from SIGTERM to SIGKILL when the service
//! will not stop on its own.

/// CLI interface.
pub mod cli;

/// Runtime configuration.
pub mod config;

/// Named defaults and timing constants.
pub mod constants;

/// Error handling.
pub mod error;

/// Health probes.
pub mod probe;

/// Service process launching and signaling.
pub mod process;

/// Cancellation signaling.
pub mod shutdown;

/// Supervisory control loop.
pub mod supervisor;
