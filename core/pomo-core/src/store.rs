//! SQLite persistence for completed sessions.
//!
//! An append-only `tasks` table. Rows are written once, when a timer runs to
//! expiry, and only ever read back for history. Timestamps are stored as UTC
//! RFC 3339 text with fixed precision so `ORDER BY start_time` is
//! chronological.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};

use crate::error::{PomoError, Result};
use crate::record::SessionRecord;

pub struct RecordStore {
    path: PathBuf,
    conn: Connection,
}

impl RecordStore {
    /// Opens (creating if needed) the store and ensures the schema exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let conn = open_connection(&path)?;
        let store = Self { path, conn };
        store.init_schema()?;
        Ok(store)
    }

    pub fn append(&self, record: &SessionRecord) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO tasks (task_name, duration_minutes, start_time, end_time) \
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    record.task,
                    record.duration_minutes,
                    format_timestamp(&record.started_at),
                    format_timestamp(&record.ended_at)
                ],
            )
            .map_err(|err| PomoError::query("Failed to insert session", err))?;

        tracing::debug!(task = %record.task, path = %self.path.display(), "Session appended");
        Ok(())
    }

    /// Streams every record, most recent start first.
    ///
    /// Rows are decoded one at a time as `f` consumes them; an error from `f`
    /// stops the scan. Calling again restarts from the newest record.
    pub fn for_each_session(&self, mut f: impl FnMut(SessionRecord) -> Result<()>) -> Result<()> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT task_name, duration_minutes, start_time, end_time FROM tasks \
                 ORDER BY start_time DESC, id DESC",
            )
            .map_err(|err| PomoError::query("Failed to prepare sessions query", err))?;

        let mut rows = stmt
            .query([])
            .map_err(|err| PomoError::query("Failed to read session rows", err))?;

        while let Some(row) = rows
            .next()
            .map_err(|err| PomoError::query("Failed to read session row", err))?
        {
            f(decode_row(row)?)?;
        }

        Ok(())
    }

    pub fn list_all(&self) -> Result<Vec<SessionRecord>> {
        let mut records = Vec::new();
        self.for_each_session(|record| {
            records.push(record);
            Ok(())
        })?;
        Ok(records)
    }

    pub fn count(&self) -> Result<u64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get::<_, i64>(0))
            .map(|count| count.max(0) as u64)
            .map_err(|err| PomoError::query("Failed to count sessions", err))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS tasks (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    task_name TEXT NOT NULL,
                    duration_minutes INTEGER NOT NULL,
                    start_time TEXT NOT NULL,
                    end_time TEXT NOT NULL
                 );",
            )
            .map_err(|err| PomoError::query("Failed to initialize schema", err))
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent).map_err(|err| PomoError::Io {
            context: "Failed to create record store directory".to_string(),
            source: err,
        })?;
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let open_err = |source: rusqlite::Error| PomoError::StoreOpen {
        path: path.to_path_buf(),
        source,
    };

    let conn = Connection::open_with_flags(path, flags).map_err(open_err)?;
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(open_err)?;
    conn.pragma_update(None, "busy_timeout", 5000)
        .map_err(open_err)?;

    Ok(conn)
}

fn decode_row(row: &Row<'_>) -> Result<SessionRecord> {
    let decode_err = |err: rusqlite::Error| PomoError::query("Failed to decode session row", err);

    let task: String = row.get(0).map_err(decode_err)?;
    let duration: i64 = row.get(1).map_err(decode_err)?;
    let start: String = row.get(2).map_err(decode_err)?;
    let end: String = row.get(3).map_err(decode_err)?;

    let duration_minutes = u32::try_from(duration)
        .map_err(|_| PomoError::StoreCorrupt(format!("negative duration {duration} for '{task}'")))?;

    Ok(SessionRecord {
        started_at: parse_timestamp(&start)?,
        ended_at: parse_timestamp(&end)?,
        task,
        duration_minutes,
    })
}

fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| PomoError::StoreCorrupt(format!("bad timestamp {value:?}: {err}")))
}
