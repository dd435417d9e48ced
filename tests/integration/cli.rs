#[path = "common/mod.rs"]
mod common;

use std::{
    fs,
    process::{Command as StdCommand, Stdio},
    thread,
    time::{Duration, Instant},
};

use assert_cmd::Command;
use common::{is_process_alive, recorded_pids, refused_port, wait_for_lines};
use nix::{
    sys::signal::{self, Signal},
    unistd::Pid,
};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn help_documents_the_watchdog_flags() {
    Command::new(assert_cmd::cargo::cargo_bin!("wdog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--poll-interval"))
        .stdout(predicate::str::contains("--grace-period"))
        .stdout(predicate::str::contains("--probe"));
}

#[test]
fn missing_service_command_is_rejected() {
    Command::new(assert_cmd::cargo::cargo_bin!("wdog"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("COMMAND"));
}

#[test]
fn unknown_probe_kind_is_rejected() {
    Command::new(assert_cmd::cargo::cargo_bin!("wdog"))
        .args(["--probe", "icmp", "--", "sleep", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn shell_mode_rejects_a_split_command() {
    Command::new(assert_cmd::cargo::cargo_bin!("wdog"))
        .args(["--shell", "--", "sleep", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--shell"));
}

#[test]
fn sigint_stops_the_watchdog_and_its_service() {
    let temp = tempdir().expect("failed to create tempdir");
    let pid_log = temp.path().join("pids.log");
    let port = refused_port();

    let mut watchdog = StdCommand::new(assert_cmd::cargo::cargo_bin!("wdog"))
        .args([
            "--poll-interval",
            "1",
            "--grace-period",
            "1",
            "--host",
            "127.0.0.1",
            "--port",
            &port.to_string(),
            "--shell",
            "--",
        ])
        .arg(format!("echo $$ >> {}; exec sleep 30", pid_log.display()))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to launch wdog");

    // The failing probe forces a service launch; wait for the first one.
    wait_for_lines(&pid_log, 1);

    signal::kill(Pid::from_raw(watchdog.id() as i32), Signal::SIGINT)
        .expect("failed to deliver SIGINT");

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = watchdog.try_wait().expect("try_wait failed") {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = watchdog.kill();
            panic!("wdog did not exit after SIGINT");
        }
        thread::sleep(Duration::from_millis(100));
    };
    assert!(status.success(), "wdog exited with {status}");

    // Every service process the watchdog ever launched must be gone.
    let content = fs::read_to_string(&pid_log).expect("pid log unreadable");
    let pids = recorded_pids(&content);
    assert!(!pids.is_empty());
    for pid in pids {
        assert!(!is_process_alive(pid), "service PID {pid} survived");
    }
}
