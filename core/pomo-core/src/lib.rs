//! # pomo-core
//!
//! Core library for the `pomo` Pomodoro timer: the session timer, the
//! SQLite record store, and the single-slot process handle that lets a
//! `stop` find a background timer.
//!
//! ## Design Principles
//!
//! - **Synchronous**: one OS process per invocation, no async runtime.
//! - **Explicit locations**: every path comes from a `PomoConfig` the caller
//!   passes in; nothing reads a hidden global.
//! - **Absence is not failure**: a missing handle or an empty store are
//!   ordinary values, not errors.

pub mod config;
pub mod error;
pub mod handle;
pub mod process;
pub mod record;
pub mod signals;
pub mod store;
pub mod timer;

pub use config::{PomoConfig, DEFAULT_SESSION_MINUTES};
pub use error::{PomoError, Result};
pub use handle::{ProcessHandle, StopOutcome};
pub use process::TIMER_CHILD_COMMAND;
pub use record::SessionRecord;
pub use signals::CancelSignal;
pub use store::RecordStore;
pub use timer::{SessionTimer, TimerOutcome};
