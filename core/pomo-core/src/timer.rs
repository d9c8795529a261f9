//! Session timer: one countdown raced against cancellation.
//!
//! ```text
//! Running ──deadline──▶ Completed  (notify, bell, append record)
//!    │
//!    └──cancel signal──▶ Cancelled  (notify, nothing written)
//! ```
//!
//! The record store is only opened once the deadline passes, so a cancelled
//! session never touches it.

use chrono::{DateTime, SubsecRound, Utc};
use std::io::Write;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::PomoConfig;
use crate::error::{PomoError, Result};
use crate::record::SessionRecord;
use crate::store::RecordStore;

const BELL: &str = "\x07";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerOutcome {
    Completed(SessionRecord),
    Cancelled,
}

pub struct SessionTimer<'a> {
    config: &'a PomoConfig,
}

impl<'a> SessionTimer<'a> {
    pub fn new(config: &'a PomoConfig) -> Self {
        Self { config }
    }

    /// Runs a session of `minutes` minutes.
    pub fn run(
        &self,
        task: &str,
        minutes: u32,
        cancel: &Receiver<i32>,
        out: &mut dyn Write,
    ) -> Result<TimerOutcome> {
        let wait = Duration::from_secs(u64::from(minutes) * 60);
        self.run_for(task, minutes, wait, cancel, out)
    }

    /// Runs a session that waits `wait` but records `minutes` as its length.
    pub fn run_for(
        &self,
        task: &str,
        minutes: u32,
        wait: Duration,
        cancel: &Receiver<i32>,
        out: &mut dyn Write,
    ) -> Result<TimerOutcome> {
        let started_at = now();
        tracing::info!(task, minutes, "Session started");

        if let Some(signal) = wait_for_deadline(wait, cancel) {
            tracing::info!(task, signal, "Session cancelled");
            writeln!(out, "\nTimer for '{}' was stopped.", task).map_err(notify_err)?;
            return Ok(TimerOutcome::Cancelled);
        }

        let ended_at = now();
        writeln!(
            out,
            "Good job! You managed to complete the session for '{}'!",
            task
        )
        .map_err(notify_err)?;
        writeln!(out, "{}", BELL).map_err(notify_err)?;

        let record = SessionRecord::new(task, minutes, started_at, ended_at);
        let store = RecordStore::open(self.config.db_file())?;
        store.append(&record)?;
        writeln!(out, "Task '{}' saved to the database.", task).map_err(notify_err)?;
        out.flush().map_err(notify_err)?;

        tracing::info!(task, minutes, "Session completed");
        Ok(TimerOutcome::Completed(record))
    }
}

/// Blocks until `wait` elapses (`None`) or a signal arrives (`Some(signal)`).
///
/// A disconnected source cannot cancel anymore; the remaining time is slept.
fn wait_for_deadline(wait: Duration, cancel: &Receiver<i32>) -> Option<i32> {
    let deadline = Instant::now() + wait;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match cancel.recv_timeout(remaining) {
            Ok(signal) => return Some(signal),
            Err(RecvTimeoutError::Timeout) => {
                if Instant::now() >= deadline {
                    return None;
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                tracing::warn!("Cancellation source closed; timer can no longer be interrupted");
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                return None;
            }
        }
    }
}

/// Current time at the precision the record store keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn notify_err(err: std::io::Error) -> PomoError {
    PomoError::Io {
        context: "Failed to write timer notification".to_string(),
        source: err,
    }
}
