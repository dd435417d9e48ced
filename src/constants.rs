//! Constants and default configuration values for the watchdog.
//!
//! This module centralizes the magic numbers and strings used throughout the
//! supervision loop so the timing contract lives in one place.

use std::time::Duration;

// ============================================================================
// Supervision Timing
// ============================================================================

/// Delay between health checks of the supervised service.
///
/// The loop sleeps this long after every iteration completes, so the real
/// cadence is interval plus whatever the iteration itself took.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Grace window between the graceful termination request and the forceful
/// kill during shutdown escalation.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(15);

/// Upper bound on a single probe round trip, so an unreachable endpoint can
/// never stall the supervision loop.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// Probe Endpoint Constants
// ============================================================================

/// Host probed for service health.
pub const DEFAULT_PROBE_HOST: &str = "localhost";

/// Port probed for service health.
pub const DEFAULT_PROBE_PORT: u16 = 35565;

/// Request path used by the HTTP probe.
pub const DEFAULT_HTTP_PATH: &str = "/";

// ============================================================================
// Shell Execution Constants
// ============================================================================

/// Default shell used for executing single-string service commands.
pub const DEFAULT_SHELL: &str = "sh";

/// Flag telling the shell to treat its argument as a command string.
pub const SHELL_COMMAND_FLAG: &str = "-c";
