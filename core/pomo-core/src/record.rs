//! Completed-session records.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

/// One completed work interval.
///
/// Only produced when a timer runs to expiry; cancelled sessions never
/// become records. `duration_minutes` is the configured length, so it need
/// not equal `ended_at - started_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionRecord {
    pub task: String,
    pub duration_minutes: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(
        task: impl Into<String>,
        duration_minutes: u32,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        Self {
            task: task.into(),
            duration_minutes,
            started_at,
            ended_at,
        }
    }

    /// One-line history entry with the start time in local time.
    pub fn history_line(&self) -> String {
        format!(
            "- Task: '{}' | Duration: {} mins | Started: {}",
            self.task,
            self.duration_minutes,
            self.started_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        )
    }
}
