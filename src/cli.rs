//! Command-line interface for watchdogd.
use std::{str::FromStr, time::Duration};

use clap::Parser;
use tracing::level_filters::LevelFilter;

use crate::{
    config::{ProbeEndpoint, ProbeKind, StartCommand, WatchdogConfig},
    constants::{
        DEFAULT_GRACE_PERIOD, DEFAULT_HTTP_PATH, DEFAULT_POLL_INTERVAL,
        DEFAULT_PROBE_HOST, DEFAULT_PROBE_PORT, DEFAULT_PROBE_TIMEOUT,
    },
};

/// Log level flag accepting either a level name ("info", "debug", ...) or
/// the numeric shorthand 0-5 that maps onto the same scale.
#[derive(Clone, Copy, Debug)]
pub struct LogLevelArg(LevelFilter);

impl LogLevelArg {
    /// The level name in the spelling `EnvFilter` expects.
    pub fn as_str(&self) -> &'static str {
        match self.0 {
            LevelFilter::OFF => "off",
            LevelFilter::ERROR => "error",
            LevelFilter::WARN => "warn",
            LevelFilter::INFO => "info",
            LevelFilter::DEBUG => "debug",
            LevelFilter::TRACE => "trace",
        }
    }
}

impl FromStr for LogLevelArg {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("log level cannot be empty".into());
        }

        let level = match trimmed.to_ascii_lowercase().as_str() {
            "0" | "off" => LevelFilter::OFF,
            "1" | "error" | "err" => LevelFilter::ERROR,
            "2" | "warn" | "warning" => LevelFilter::WARN,
            "3" | "info" => LevelFilter::INFO,
            "4" | "debug" => LevelFilter::DEBUG,
            "5" | "trace" => LevelFilter::TRACE,
            _ => return Err(format!("invalid log level '{trimmed}' (names or 0-5)")),
        };

        Ok(LogLevelArg(level))
    }
}

/// Command-line interface for watchdogd.
#[derive(Parser)]
#[command(name = "watchdogd", version, author)]
#[command(about = "A health-probing watchdog for a single server process", long_about = None)]
pub struct Cli {
    /// Logging verbosity; overrides `RUST_LOG` when set.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,

    /// Seconds to wait between health checks.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_POLL_INTERVAL.as_secs())]
    pub poll_interval: u64,

    /// Seconds granted between the graceful stop request and the forceful kill.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_GRACE_PERIOD.as_secs())]
    pub grace_period: u64,

    /// Host probed for service health.
    #[arg(long, value_name = "HOST", default_value = DEFAULT_PROBE_HOST)]
    pub host: String,

    /// Port probed for service health.
    #[arg(long, value_name = "PORT", default_value_t = DEFAULT_PROBE_PORT)]
    pub port: u16,

    /// Probe used for health checks: "tcp" or "http".
    #[arg(long, value_name = "KIND", default_value_t = ProbeKind::Tcp)]
    pub probe: ProbeKind,

    /// Request path for the http probe.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_HTTP_PATH)]
    pub http_path: String,

    /// Seconds before a probe round trip is abandoned.
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
    pub probe_timeout: u64,

    /// Treat the command as a single shell command line run via `sh -c`.
    #[arg(long)]
    pub shell: bool,

    /// Command used to start the supervised service.
    #[arg(trailing_var_arg = true, required = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Builds the typed runtime configuration from the parsed flags.
    pub fn into_config(self) -> Result<WatchdogConfig, String> {
        let command = if self.shell {
            match self.command.as_slice() {
                [line] => StartCommand::shell(line.clone()),
                _ => return Err("--shell takes exactly one quoted command string".into()),
            }
        } else {
            StartCommand::from_argv(self.command)
                .ok_or_else(|| "service command cannot be empty".to_string())?
        };

        let mut config = WatchdogConfig::new(command);
        config.probe = self.probe;
        config.endpoint = ProbeEndpoint::new(self.host, self.port);
        config.http_path = self.http_path;
        config.probe_timeout = Duration::from_secs(self.probe_timeout);
        config.poll_interval = Duration::from_secs(self.poll_interval);
        config.grace_period = Duration::from_secs(self.grace_period);
        Ok(config)
    }
}

/// Parses the process arguments into a [`Cli`].
pub fn parse_args() -> Cli {
    Cli::parse()
}
