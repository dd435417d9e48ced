//! Supervisory control loop for the single managed service.
//!
//! The loop is deliberately sequential: probe, maybe stop, maybe start,
//! sleep. Nothing here runs concurrently with anything else, which is what
//! makes the at-most-one-process guarantee easy to uphold.
//!
//! Logging contract: lifecycle events (service start, healthy probe
//! reports, final status) are emitted at info; failed health checks and
//! every escalation step are emitted at warn.
use std::{process::ExitStatus, thread, time::Duration};

use tracing::{debug, error, info, warn};

use crate::{
    config::StartCommand,
    constants::{DEFAULT_GRACE_PERIOD, DEFAULT_POLL_INTERVAL},
    error::WatchdogError,
    probe::HealthProbe,
    process::{Launcher, ProcessHandle},
    shutdown::ShutdownSignal,
};

/// Keeps one service process alive until cancelled.
///
/// The supervisor owns at most one process handle at a time. A handle is
/// retained after the process exits so the exit status stays available, and
/// is only replaced when a new process is started; a new process is never
/// started while the previous one could still be running.
pub struct Supervisor<L: Launcher, P: HealthProbe> {
    command: StartCommand,
    launcher: L,
    probe: P,
    shutdown: ShutdownSignal,
    process: Option<L::Handle>,
    last_status: Option<ExitStatus>,
    poll_interval: Duration,
    grace_period: Duration,
}

impl<L: Launcher, P: HealthProbe> Supervisor<L, P> {
    /// Creates a supervisor with default timing and no process started.
    pub fn new(command: StartCommand, launcher: L, probe: P, shutdown: ShutdownSignal) -> Self {
        Self {
            command,
            launcher,
            probe,
            shutdown,
            process: None,
            last_status: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Overrides the delay between health checks.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the grace window between the termination request and the
    /// forceful kill.
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Runs the supervision loop until the shutdown signal is cancelled.
    ///
    /// Each iteration probes the service and, when the probe fails, stops
    /// whatever is left of the current process and starts a replacement.
    /// Probe failures and status-query failures never end the loop; only
    /// cancellation and a failed spawn do. Either way the current process is
    /// stopped before this returns, and the returned status is the service's
    /// final exit status when one was observed.
    pub fn run(&mut self) -> Result<Option<ExitStatus>, WatchdogError> {
        info!(
            "Supervising `{}` with a health check every {:?}",
            self.command, self.poll_interval
        );

        let outcome = self.run_internal();
        if let Err(ref err) = outcome {
            error!("Supervision aborted: {err}");
        }

        // Sole exit path: the service process, if any, never outlives the
        // watchdog.
        let final_status = self.stop()?;
        outcome?;

        info!("Supervision loop stopped");
        Ok(final_status.or(self.last_status))
    }

    fn run_internal(&mut self) -> Result<(), WatchdogError> {
        while !self.shutdown.is_cancelled() {
            if self.check_server() {
                if self.shutdown.sleep(self.poll_interval) {
                    break;
                }
                continue;
            }

            if !self.is_process_dead() {
                warn!("Service is unresponsive but its process is still alive. Stopping it...");
                self.stop()?;
                // The grace wait inside stop() is long; re-check before
                // starting a replacement that would only be stopped again.
                if self.shutdown.is_cancelled() {
                    break;
                }
            }

            warn!("Service is down. Restarting...");
            self.start()?;

            if self.shutdown.sleep(self.poll_interval) {
                break;
            }
        }
        Ok(())
    }

    /// Starts a new service process, replacing the previous handle.
    ///
    /// The previous process must already have been confirmed exited; its
    /// handle is discarded here. Returns as soon as the process is running,
    /// without waiting for the service inside it to become ready.
    pub fn start(&mut self) -> Result<(), WatchdogError> {
        info!("Starting service: `{}`", self.command);
        let handle = self.launcher.spawn(&self.command)?;
        info!("Service started with PID {}", handle.id());
        self.process = Some(handle);
        Ok(())
    }

    /// Returns `true` when no process is held or the held process has exited.
    ///
    /// Never blocks. A failed status query counts as "still alive": the
    /// uncertainty is then resolved by the stop() escalation, which is safe
    /// against a live process, rather than by starting a second one.
    pub fn is_process_dead(&mut self) -> bool {
        let Some(process) = self.process.as_mut() else {
            return true;
        };
        match process.poll_status() {
            Ok(Some(status)) => {
                debug!("Service process {} has exited: {status}", process.id());
                self.last_status = Some(status);
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!("Failed to query service process status: {err}");
                false
            }
        }
    }

    /// Stops the current service process through the shutdown escalation.
    ///
    /// Without a process this is a no-op; with an already-exited one it just
    /// reports the exit status again. Otherwise: request termination, wait
    /// out the full grace period unconditionally, and only then force-kill
    /// and reap a process that still has not exited. Calling this twice in a
    /// row signals the process at most once.
    pub fn stop(&mut self) -> Result<Option<ExitStatus>, WatchdogError> {
        let Some(process) = self.process.as_mut() else {
            debug!("No service process to stop");
            return Ok(None);
        };
        let pid = process.id();

        if let Some(status) = Self::poll_lenient(process) {
            debug!("Service process {pid} already exited: {status}");
            self.last_status = Some(status);
            return Ok(Some(status));
        }

        info!("Sending SIGTERM to service process {pid}");
        process
            .request_termination()
            .map_err(|source| WatchdogError::Signal { pid, source })?;

        // The full grace window is granted even if the process exits right
        // away; an early exit is picked up by the poll below.
        thread::sleep(self.grace_period);

        if let Some(status) = Self::poll_lenient(process) {
            info!("Service process {pid} exited within the grace period: {status}");
            self.last_status = Some(status);
            return Ok(Some(status));
        }

        warn!(
            "Service process {pid} did not exit after SIGTERM; sending SIGKILL"
        );
        process
            .force_kill()
            .map_err(|source| WatchdogError::Signal { pid, source })?;
        let status = process
            .wait()
            .map_err(|source| WatchdogError::Wait { pid, source })?;

        info!("Service process {pid} terminated: {status}");
        self.last_status = Some(status);
        Ok(Some(status))
    }

    /// Probes the service once. Any probe error is an unhealthy verdict,
    /// never a loop failure.
    pub fn check_server(&self) -> bool {
        match self.probe.probe() {
            Ok(report) => {
                info!("Service healthy: {report}");
                true
            }
            Err(err) => {
                warn!("Health check failed: {err}");
                false
            }
        }
    }

    /// Non-blocking status poll that treats a failed query as "still
    /// running", so the caller keeps escalating instead of giving up.
    fn poll_lenient(process: &mut L::Handle) -> Option<ExitStatus> {
        match process.poll_status() {
            Ok(status) => status,
            Err(err) => {
                warn!("Failed to query service process status: {err}");
                None
            }
        }
    }
}
