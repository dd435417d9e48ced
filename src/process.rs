//! Launching and signaling the supervised service process.
//!
//! The supervisor never touches the OS directly; it goes through the
//! [`Launcher`] and [`ProcessHandle`] traits so tests can substitute scripted
//! processes for real ones.
use std::{
    io,
    process::{Child, Command, ExitStatus},
};

use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};
use tracing::debug;

use crate::{config::StartCommand, error::WatchdogError};

/// Owned handle to a single supervised process.
///
/// The supervisor holds at most one handle at a time and keeps it until a
/// replacement process is started, so an exit status stays queryable after
/// the process is gone.
pub trait ProcessHandle {
    /// Non-blocking status query; `Some` once the process has exited.
    ///
    /// The first observation reaps the process; later calls keep returning
    /// the same status.
    fn poll_status(&mut self) -> io::Result<Option<ExitStatus>>;

    /// Requests graceful termination (SIGTERM), which the process honors on
    /// its own schedule.
    ///
    /// Requesting termination of an already-exited process is not an error.
    fn request_termination(&mut self) -> io::Result<()>;

    /// Forcefully kills the process (SIGKILL).
    ///
    /// Killing an already-exited process is not an error.
    fn force_kill(&mut self) -> io::Result<()>;

    /// Blocks until the process has terminated and returns its exit status.
    fn wait(&mut self) -> io::Result<ExitStatus>;

    /// OS process id, for logging.
    fn id(&self) -> u32;
}

/// Starts service processes from a [`StartCommand`].
pub trait Launcher {
    /// Concrete handle type owned by the supervisor.
    type Handle: ProcessHandle;

    /// Spawns a new service process.
    ///
    /// Returns as soon as the process is launched; whether the service
    /// inside it ever becomes ready is for the health probe to discover.
    fn spawn(&self, command: &StartCommand) -> Result<Self::Handle, WatchdogError>;
}

/// Production [`Launcher`] backed by `std::process`.
///
/// The service inherits the watchdog's stdio, so its output lands in the
/// same place as the watchdog's own logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsLauncher;

impl Launcher for OsLauncher {
    type Handle = OsProcess;

    fn spawn(&self, command: &StartCommand) -> Result<OsProcess, WatchdogError> {
        let (program, args) = command.resolved();
        let mut cmd = Command::new(program);
        cmd.args(args);

        debug!("Executing command: {cmd:?}");

        match cmd.spawn() {
            Ok(child) => {
                debug!("Service process started with PID {}", child.id());
                Ok(OsProcess {
                    child,
                    status: None,
                })
            }
            Err(source) => Err(WatchdogError::Spawn {
                command: command.to_string(),
                source,
            }),
        }
    }
}

/// [`ProcessHandle`] over a [`std::process::Child`].
#[derive(Debug)]
pub struct OsProcess {
    child: Child,
    /// Exit status cached on first observation. Once set, the PID may have
    /// been reused by the OS and must never be signalled again.
    status: Option<ExitStatus>,
}

impl OsProcess {
    fn pid(&self) -> Pid {
        Pid::from_raw(self.child.id() as i32)
    }

    fn signal(&mut self, signal_kind: Signal) -> io::Result<()> {
        if self.status.is_some() {
            debug!(
                "Service process {} already exited; not sending {signal_kind}",
                self.child.id()
            );
            return Ok(());
        }
        match signal::kill(self.pid(), signal_kind) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                // Exited between the last status poll and this signal; the
                // next poll or wait will reap it.
                debug!(
                    "Service process {} exited before {signal_kind} could be delivered",
                    self.child.id()
                );
                Ok(())
            }
            Err(err) => Err(nix_error_to_io(err)),
        }
    }
}

impl ProcessHandle for OsProcess {
    fn poll_status(&mut self) -> io::Result<Option<ExitStatus>> {
        if let Some(status) = self.status {
            return Ok(Some(status));
        }
        let status = self.child.try_wait()?;
        if let Some(observed) = status {
            self.status = Some(observed);
        }
        Ok(status)
    }

    fn request_termination(&mut self) -> io::Result<()> {
        self.signal(Signal::SIGTERM)
    }

    fn force_kill(&mut self) -> io::Result<()> {
        self.signal(Signal::SIGKILL)
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        if let Some(status) = self.status {
            return Ok(status);
        }
        let status = self.child.wait()?;
        self.status = Some(status);
        Ok(status)
    }

    fn id(&self) -> u32 {
        self.child.id()
    }
}

fn nix_error_to_io(err: Errno) -> io::Error {
    io::Error::from_raw_os_error(err as i32)
}
