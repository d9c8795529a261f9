//! Foreground and background session launching.
//!
//! ## Background lifecycle
//!
//! 1. `start --background` re-executes this binary as
//!    `pomo timer-child --task <t> --time <m>` with inherited stdio, so the
//!    child's notifications still land in the user's terminal.
//! 2. The parent records the child's PID in the process handle and exits
//!    without waiting.
//! 3. The child runs the timer like a foreground session. When it leaves the
//!    timer it clears the handle, but only if the handle still names it.
//!
//! `timer-child` has no `--background` flag, so a child can never spawn
//! another child.

use std::env;
use std::io::{self, Write};
use std::process::{Command, Stdio};

use pomo_core::config::ROOT_ENV;
use pomo_core::{
    CancelSignal, PomoConfig, PomoError, ProcessHandle, Result, SessionTimer, TimerOutcome,
    TIMER_CHILD_COMMAND,
};

/// Runs the timer inline, blocking until it completes or is interrupted.
pub fn run_foreground(config: &PomoConfig, task: &str, minutes: u32) -> Result<TimerOutcome> {
    let cancel = CancelSignal::install()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    SessionTimer::new(config).run(task, minutes, cancel.receiver(), &mut out)
}

/// Entry point of the spawned background process.
pub fn run_background_child(config: &PomoConfig, task: &str, minutes: u32) -> Result<()> {
    let pid = std::process::id();
    tracing::debug!(pid, task, minutes, "Background timer child started");

    let outcome = run_foreground(config, task, minutes);

    match ProcessHandle::new(config.pid_file()).clear_if_owned(pid) {
        Ok(true) => tracing::debug!(pid, "Cleared own process handle"),
        Ok(false) => {}
        Err(err) => tracing::warn!(error = %err, pid, "Failed to clear process handle"),
    }

    outcome.map(|_| ())
}

/// Spawns a detached timer process and records its PID. Returns the PID.
pub fn spawn_background(config: &PomoConfig, task: &str, minutes: u32) -> Result<u32> {
    let exe = env::current_exe().map_err(PomoError::Spawn)?;

    let child = Command::new(&exe)
        .arg(TIMER_CHILD_COMMAND)
        .arg("--task")
        .arg(task)
        .arg("--time")
        .arg(minutes.to_string())
        .env(ROOT_ENV, config.root())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(PomoError::Spawn)?;

    let pid = child.id();
    tracing::info!(pid, task, minutes, exe = %exe.display(), "Background timer spawned");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Err(err) = ProcessHandle::new(config.pid_file()).write(pid) {
        tracing::warn!(error = %err, pid, "Could not save PID file");
        writeln!(
            out,
            "Warning: could not save PID file ({}). 'pomo stop' will not be able to end this timer.",
            err
        )
        .map_err(write_err)?;
    }

    writeln!(
        out,
        "Pomodoro timer for '{}' is running in the background. PID: {}",
        task, pid
    )
    .map_err(write_err)?;
    writeln!(out, "Use 'pomo stop' to end it.").map_err(write_err)?;
    out.flush().map_err(write_err)?;

    Ok(pid)
}

fn write_err(err: io::Error) -> PomoError {
    PomoError::Io {
        context: "Failed to write launch notice".to_string(),
        source: err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> PomoConfig {
        PomoConfig::with_root(dir.path().to_path_buf())
    }

    #[test]
    fn child_clears_handle_naming_itself() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = config_in(&dir);
        let handle = ProcessHandle::new(config.pid_file());
        handle.write(std::process::id()).expect("write handle");

        run_background_child(&config, "Focus", 0).expect("child run");

        assert_eq!(handle.read().expect("read"), None);
    }

    #[test]
    fn child_keeps_handle_naming_another_timer() {
        let dir = tempfile::tempdir().expect("temp dir");
        let config = config_in(&dir);
        let handle = ProcessHandle::new(config.pid_file());
        let newer = std::process::id() + 1;
        handle.write(newer).expect("write handle");

        run_background_child(&config, "Focus", 0).expect("child run");

        assert_eq!(handle.read().expect("read"), Some(newer));
    }
}
