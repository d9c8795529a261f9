//! `pomo stop`: end the recorded background timer.

use std::io::Write;

use pomo_core::{PomoConfig, PomoError, ProcessHandle, Result, StopOutcome};

pub fn run(config: &PomoConfig) -> Result<()> {
    let outcome = ProcessHandle::new(config.pid_file()).stop_active()?;
    tracing::debug!(?outcome, "Stop finished");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", describe(outcome)).map_err(|err| PomoError::Io {
        context: "Failed to write stop result".to_string(),
        source: err,
    })
}

fn describe(outcome: StopOutcome) -> String {
    match outcome {
        StopOutcome::NoActiveTimer => {
            "No active Pomodoro timer found in the background.".to_string()
        }
        StopOutcome::Stopped { pid } => {
            format!("Successfully stopped Pomodoro timer (PID: {}).", pid)
        }
        StopOutcome::AlreadyExited { pid } => format!(
            "Pomodoro timer (PID: {}) had already finished. No active timer remains.",
            pid
        ),
        StopOutcome::NotATimer { pid } => format!(
            "PID {} no longer belongs to a Pomodoro timer; removed the stale handle.",
            pid
        ),
    }
}
