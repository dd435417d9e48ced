//! Runtime configuration for watchdogd.
//!
//! The watchdog is configured entirely by its caller (the `wdog` binary
//! assembles a [`WatchdogConfig`] from command-line flags); there is no
//! configuration file to parse or reload.
use std::{fmt, time::Duration};

use strum_macros::{AsRefStr, Display, EnumString};

use crate::constants::{
    DEFAULT_GRACE_PERIOD, DEFAULT_HTTP_PATH, DEFAULT_POLL_INTERVAL,
    DEFAULT_PROBE_HOST, DEFAULT_PROBE_PORT, DEFAULT_PROBE_TIMEOUT, DEFAULT_SHELL,
    SHELL_COMMAND_FLAG,
};

/// Specification of the command used to start the supervised service.
///
/// The command is opaque to the watchdog: it is handed to the OS verbatim on
/// every (re)start and never inspected or rewritten in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartCommand {
    /// A program and its arguments, executed directly.
    Argv {
        /// Executable to launch.
        program: String,
        /// Arguments passed to the executable.
        args: Vec<String>,
    },
    /// A single opaque command line, executed via `sh -c`.
    Shell(String),
}

impl StartCommand {
    /// Builds a direct-execution command from a non-empty argument vector.
    ///
    /// Returns `None` when `argv` is empty, since there is no program to run.
    pub fn from_argv(mut argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        let program = argv.remove(0);
        Some(Self::Argv {
            program,
            args: argv,
        })
    }

    /// Wraps a command line for `sh -c` execution.
    pub fn shell(line: impl Into<String>) -> Self {
        Self::Shell(line.into())
    }

    /// The program and argument list actually handed to the OS.
    pub fn resolved(&self) -> (String, Vec<String>) {
        match self {
            Self::Argv { program, args } => (program.clone(), args.clone()),
            Self::Shell(line) => (
                DEFAULT_SHELL.to_string(),
                vec![SHELL_COMMAND_FLAG.to_string(), line.clone()],
            ),
        }
    }
}

impl fmt::Display for StartCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argv { program, args } => {
                write!(f, "{program}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                Ok(())
            }
            Self::Shell(line) => write!(f, "{line}"),
        }
    }
}

/// Which probe implementation verifies service health.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum ProbeKind {
    /// Opaque TCP connection round trip against the service port.
    #[default]
    Tcp,
    /// HTTP GET expecting a 2xx response.
    Http,
}

/// Network endpoint probed for service health.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeEndpoint {
    /// Hostname or address the probe connects to.
    pub host: String,
    /// Port the probe connects to.
    pub port: u16,
}

impl ProbeEndpoint {
    /// Creates an endpoint from a host and port.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// The URL requested by the HTTP probe.
    pub fn http_url(&self, path: &str) -> String {
        let separator = if path.starts_with('/') { "" } else { "/" };
        format!("http://{}:{}{separator}{path}", self.host, self.port)
    }
}

impl Default for ProbeEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_HOST, DEFAULT_PROBE_PORT)
    }
}

impl fmt::Display for ProbeEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Complete runtime configuration for one supervised service.
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// Command used to start the service.
    pub command: StartCommand,
    /// Probe implementation used for health checks.
    pub probe: ProbeKind,
    /// Endpoint the probe checks.
    pub endpoint: ProbeEndpoint,
    /// Request path for the HTTP probe.
    pub http_path: String,
    /// Upper bound on a single probe round trip.
    pub probe_timeout: Duration,
    /// Delay between health checks.
    pub poll_interval: Duration,
    /// Grace window between SIGTERM and SIGKILL during shutdown escalation.
    pub grace_period: Duration,
}

impl WatchdogConfig {
    /// Creates a configuration with default probing and timing for `command`.
    pub fn new(command: StartCommand) -> Self {
        Self {
            command,
            probe: ProbeKind::default(),
            endpoint: ProbeEndpoint::default(),
            http_path: DEFAULT_HTTP_PATH.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }
}
