//! Single-slot process handle for the background timer.
//!
//! The handle file holds one decimal PID: the background timer that a `stop`
//! should terminate. There is at most one.
//!
//! # Stop ordering
//!
//! `stop_active` removes the file *before* it signals. A second `stop`
//! racing the first (or retried after it) then reads "no handle" instead of
//! signalling the same PID twice, or signalling whatever process inherited
//! that PID after the timer exited.
//!
//! # Stale handles
//!
//! A handle can outlive its timer (crash, SIGKILL, reboot). Signalling a PID
//! that no longer exists is a normal outcome, reported as
//! `StopOutcome::AlreadyExited`. A PID now owned by an unrelated process is
//! left alone and reported as `StopOutcome::NotATimer`.

use fs_err as fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{PomoError, Result};
use crate::process::{self, ProcessIdentity, SignalOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    NoActiveTimer,
    Stopped { pid: u32 },
    AlreadyExited { pid: u32 },
    NotATimer { pid: u32 },
}

#[derive(Debug, Clone)]
pub struct ProcessHandle {
    path: PathBuf,
}

impl ProcessHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records `pid` as the active background timer, replacing any prior handle.
    ///
    /// The PID is written to a temp file in the same directory and renamed into
    /// place, so a concurrent reader sees the old handle or the new one, never a
    /// partial write.
    pub fn write(&self, pid: u32) -> Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)
                    .map_err(|err| PomoError::handle_io("Failed to create handle directory", err))?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|err| PomoError::handle_io("Failed to create temp PID file", err))?;
        tmp.write_all(pid.to_string().as_bytes())
            .map_err(|err| PomoError::handle_io("Failed to write temp PID file", err))?;
        tmp.flush()
            .map_err(|err| PomoError::handle_io("Failed to flush temp PID file", err))?;
        tmp.persist(&self.path)
            .map_err(|err| PomoError::handle_io("Failed to persist PID file", err.error))?;

        tracing::debug!(pid, path = %self.path.display(), "Process handle written");
        Ok(())
    }

    /// Returns the recorded PID, or `None` when no handle exists.
    pub fn read(&self) -> Result<Option<u32>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(PomoError::handle_io("Failed to read PID file", err)),
        };

        parse_pid(&content).map(Some).ok_or_else(|| PomoError::CorruptHandle {
            path: self.path.clone(),
            content: content.trim().to_string(),
        })
    }

    /// Removes the handle. A missing file is not an error.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PomoError::handle_io("Failed to remove PID file", err)),
        }
    }

    /// Removes the handle only if it still names `pid`.
    ///
    /// Returns whether a handle was removed. Used by a timer leaving its wait
    /// so a later `stop` does not target a dead or recycled PID.
    pub fn clear_if_owned(&self, pid: u32) -> Result<bool> {
        match self.read() {
            Ok(Some(recorded)) if recorded == pid => {
                self.clear()?;
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(PomoError::CorruptHandle { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Stops the recorded background timer, if any.
    pub fn stop_active(&self) -> Result<StopOutcome> {
        let pid = match self.read() {
            Ok(Some(pid)) => pid,
            Ok(None) => return Ok(StopOutcome::NoActiveTimer),
            Err(err @ PomoError::CorruptHandle { .. }) => {
                // Nothing can ever be signalled through a corrupt handle.
                self.clear()?;
                return Err(err);
            }
            Err(err) => return Err(err),
        };

        // Must complete before any signal is sent.
        self.clear()?;
        tracing::debug!(pid, "Process handle removed, signalling timer");

        match process::identify(pid) {
            ProcessIdentity::Gone => return Ok(StopOutcome::AlreadyExited { pid }),
            ProcessIdentity::Other => {
                tracing::warn!(pid, "Handle PID now belongs to another process; not signalling");
                return Ok(StopOutcome::NotATimer { pid });
            }
            ProcessIdentity::Timer | ProcessIdentity::Unknown => {}
        }

        match process::terminate(pid)? {
            SignalOutcome::Delivered => Ok(StopOutcome::Stopped { pid }),
            SignalOutcome::NotFound => Ok(StopOutcome::AlreadyExited { pid }),
        }
    }
}

fn parse_pid(content: &str) -> Option<u32> {
    content
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|pid| *pid > 0 && i32::try_from(*pid).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command, Stdio};

    fn handle_in(dir: &tempfile::TempDir) -> ProcessHandle {
        ProcessHandle::new(dir.path().join("pomo.pid"))
    }

    #[test]
    fn read_returns_none_when_absent() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(handle_in(&dir).read().expect("read"), None);
    }

    #[test]
    fn read_returns_written_pid_until_cleared() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        handle.write(4242).expect("write");
        assert_eq!(handle.read().expect("read"), Some(4242));
        assert_eq!(handle.read().expect("read again"), Some(4242));

        handle.write(4343).expect("overwrite");
        assert_eq!(handle.read().expect("read"), Some(4343));

        handle.clear().expect("clear");
        assert_eq!(handle.read().expect("read"), None);
        handle.clear().expect("clear is idempotent");
    }

    #[test]
    fn concurrent_reader_never_sees_partial_write() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);
        handle.write(4242).expect("initial write");

        let writer = {
            let handle = handle.clone();
            std::thread::spawn(move || {
                for _ in 0..2_000 {
                    handle.write(4242).expect("rewrite");
                }
            })
        };

        let mut reads = 0;
        while !writer.is_finished() {
            match handle.read() {
                Ok(Some(pid)) => assert_eq!(pid, 4242),
                Ok(None) => panic!("handle vanished during rewrite"),
                Err(err) => panic!("reader saw a partial handle: {err}"),
            }
            reads += 1;
        }
        writer.join().expect("writer thread");

        assert!(reads > 0);
        assert_eq!(handle.read().expect("read"), Some(4242));
        let leftovers = std::fs::read_dir(dir.path()).expect("list dir").count();
        assert_eq!(leftovers, 1, "temp files left behind");
    }

    #[test]
    fn write_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = ProcessHandle::new(dir.path().join("a").join("b").join("pomo.pid"));

        handle.write(17).expect("write");
        assert_eq!(handle.read().expect("read"), Some(17));
    }

    #[test]
    fn tolerates_trailing_newline() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);
        std::fs::write(handle.path(), "1234\n").unwrap();

        assert_eq!(handle.read().expect("read"), Some(1234));
    }

    #[test]
    fn rejects_garbage_and_group_pids() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        for content in ["not-a-pid", "0", "-1", "4294967295", ""] {
            std::fs::write(handle.path(), content).unwrap();
            let err = handle.read().expect_err(content);
            assert!(matches!(err, PomoError::CorruptHandle { .. }), "{content}");
        }
    }

    #[test]
    fn stop_without_handle_is_a_no_op() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        assert_eq!(handle.stop_active().expect("stop"), StopOutcome::NoActiveTimer);
        assert_eq!(handle.stop_active().expect("stop"), StopOutcome::NoActiveTimer);
    }

    #[test]
    fn stop_with_exited_pid_reports_already_exited() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        let mut child = Command::new("true").spawn().expect("spawn true");
        let pid = child.id();
        child.wait().expect("reap child");
        handle.write(pid).expect("write");

        assert_eq!(
            handle.stop_active().expect("stop"),
            StopOutcome::AlreadyExited { pid }
        );
        assert!(!handle.path().exists());
    }

    #[test]
    fn stop_leaves_unrelated_process_alone() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .expect("spawn sleep");
        let pid = child.id();
        handle.write(pid).expect("write");

        assert_eq!(
            handle.stop_active().expect("stop"),
            StopOutcome::NotATimer { pid }
        );
        assert!(!handle.path().exists());
        assert!(process::is_pid_alive(pid));

        let _ = child.kill();
        let _ = child.wait();
    }

    #[test]
    fn second_stop_observes_cleared_handle() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        let mut child = Command::new("sh")
            .args(["-c", "sleep 30", "timer-child"])
            .spawn()
            .expect("spawn stand-in timer");
        let pid = child.id();
        handle.write(pid).expect("write");

        let first = handle.stop_active().expect("first stop");
        assert!(
            matches!(first, StopOutcome::Stopped { pid: p } | StopOutcome::NotATimer { pid: p } if p == pid),
            "unexpected first outcome: {first:?}"
        );
        assert_eq!(
            handle.stop_active().expect("second stop"),
            StopOutcome::NoActiveTimer
        );

        let _ = child.kill();
        let _ = child.wait();
    }

    #[test]
    fn corrupt_handle_is_removed_and_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);
        std::fs::write(handle.path(), "garbage").unwrap();

        let err = handle.stop_active().expect_err("corrupt handle");
        assert!(matches!(err, PomoError::CorruptHandle { .. }));
        assert_eq!(handle.stop_active().expect("stop"), StopOutcome::NoActiveTimer);
    }

    #[test]
    fn clear_if_owned_only_removes_matching_pid() {
        let dir = tempfile::tempdir().expect("temp dir");
        let handle = handle_in(&dir);

        handle.write(100).expect("write");
        assert!(!handle.clear_if_owned(200).expect("foreign pid"));
        assert_eq!(handle.read().expect("read"), Some(100));

        assert!(handle.clear_if_owned(100).expect("own pid"));
        assert_eq!(handle.read().expect("read"), None);
        assert!(!handle.clear_if_owned(100).expect("already gone"));
    }
}
