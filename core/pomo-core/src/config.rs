//! Storage configuration and path management for pomo.
//!
//! Every invocation of the tool has to find the same record store and the
//! same process handle without talking to the others, so both live under one
//! well-known root directory. `PomoConfig` is built once in `main` and passed
//! down explicitly; tests point it at a temp directory with `with_root`.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{PomoError, Result};

/// Environment variable that overrides the root directory.
pub const ROOT_ENV: &str = "POMO_HOME";

const DEFAULT_DIR_NAME: &str = ".pomo";
const DB_FILE_NAME: &str = "pomodoro.db";
const PID_FILE_NAME: &str = "pomo.pid";

/// Default pomodoro length in minutes.
pub const DEFAULT_SESSION_MINUTES: u32 = 25;

/// Central configuration for all pomo storage paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PomoConfig {
    /// Root directory for all pomo data (default: ~/.pomo)
    root: PathBuf,
}

impl PomoConfig {
    /// Resolves the root from `POMO_HOME`, falling back to `~/.pomo`.
    pub fn from_env() -> Result<Self> {
        if let Some(root) = env::var_os(ROOT_ENV).filter(|value| !value.is_empty()) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = dirs::home_dir().ok_or(PomoError::HomeDirNotFound)?;
        Ok(Self::with_root(home.join(DEFAULT_DIR_NAME)))
    }

    /// Creates a config with a custom root directory.
    pub fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the SQLite record store.
    pub fn db_file(&self) -> PathBuf {
        self.root.join(DB_FILE_NAME)
    }

    /// Path to the single-slot background process handle.
    pub fn pid_file(&self) -> PathBuf {
        self.root.join(PID_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root_sets_custom_path() {
        let config = PomoConfig::with_root(PathBuf::from("/tmp/test-pomo"));
        assert_eq!(config.root(), Path::new("/tmp/test-pomo"));
    }

    #[test]
    fn test_db_file_path() {
        let config = PomoConfig::with_root(PathBuf::from("/tmp/pomo"));
        assert_eq!(config.db_file(), PathBuf::from("/tmp/pomo/pomodoro.db"));
    }

    #[test]
    fn test_pid_file_path() {
        let config = PomoConfig::with_root(PathBuf::from("/tmp/pomo"));
        assert_eq!(config.pid_file(), PathBuf::from("/tmp/pomo/pomo.pid"));
    }
}
