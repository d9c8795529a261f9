//! Process probing and signalling for background timers.
//!
//! Operating systems reuse PIDs. A handle naming PID 12345 may outlive the
//! timer that wrote it, and an unrelated process can later receive that PID.
//! Before signalling we look at the target's command line: a background timer
//! always runs as `<exe> timer-child ...`.

use std::io;

use sysinfo::{Pid, ProcessRefreshKind, System, UpdateKind};

use crate::error::{PomoError, Result};

/// Subcommand a background timer child is launched with.
pub const TIMER_CHILD_COMMAND: &str = "timer-child";

/// What the process behind a PID turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessIdentity {
    /// Command line carries the timer-child marker.
    Timer,
    /// Alive, command line readable, and not ours.
    Other,
    /// Alive but the command line could not be read.
    Unknown,
    /// No such process.
    Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalOutcome {
    Delivered,
    /// ESRCH: the process exited before the signal landed.
    NotFound,
}

pub fn is_pid_alive(pid: u32) -> bool {
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    if raw <= 0 {
        return false;
    }

    // SAFETY: kill with signal 0 performs error checking only; nothing is delivered.
    #[allow(unsafe_code)]
    unsafe {
        libc::kill(raw, 0) == 0
    }
}

/// Classifies the process behind `pid` by its command line.
pub fn identify(pid: u32) -> ProcessIdentity {
    let mut sys = System::new();
    let sys_pid = Pid::from(pid as usize);
    sys.refresh_process_specifics(
        sys_pid,
        ProcessRefreshKind::new().with_cmd(UpdateKind::Always),
    );

    let Some(process) = sys.process(sys_pid) else {
        return if is_pid_alive(pid) {
            ProcessIdentity::Unknown
        } else {
            ProcessIdentity::Gone
        };
    };

    classify_cmd(process.cmd())
}

fn classify_cmd(cmd: &[String]) -> ProcessIdentity {
    if cmd.is_empty() {
        ProcessIdentity::Unknown
    } else if cmd.iter().skip(1).any(|arg| arg == TIMER_CHILD_COMMAND) {
        ProcessIdentity::Timer
    } else {
        ProcessIdentity::Other
    }
}

/// Sends SIGTERM to `pid`.
///
/// A vanished process is reported as `SignalOutcome::NotFound` rather than
/// an error; any other failure (EPERM, invalid pid) is an error.
pub fn terminate(pid: u32) -> Result<SignalOutcome> {
    let raw = i32::try_from(pid)
        .ok()
        .filter(|raw| *raw > 0)
        .ok_or_else(|| PomoError::Signal {
            pid,
            source: io::Error::from_raw_os_error(libc::EINVAL),
        })?;

    // SAFETY: libc::kill with SIGTERM is a standard POSIX signal delivery to a
    // single positive PID; process groups (0 / negative) are rejected above.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::kill(raw, libc::SIGTERM) };
    if rc == 0 {
        return Ok(SignalOutcome::Delivered);
    }

    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(SignalOutcome::NotFound)
    } else {
        Err(PomoError::Signal { pid, source: err })
    }
}
