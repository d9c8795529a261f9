//! `pomo view`: completed-session history, most recent first.

use std::io::{self, Write};

use pomo_core::{PomoConfig, PomoError, RecordStore, Result};

const HEADER: &str = "--- Pomodoro Task History ---";
const EMPTY_MESSAGE: &str = "No tasks found in the database.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    /// One JSON object per line.
    Json,
}

pub fn run(config: &PomoConfig, format: Format) -> Result<()> {
    let store = RecordStore::open(config.db_file())?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render(&store, format, &mut out)
}

fn render(store: &RecordStore, format: Format, out: &mut dyn Write) -> Result<()> {
    if format == Format::Text {
        writeln!(out, "\n{}", HEADER).map_err(write_err)?;
    }

    let mut found = false;
    store.for_each_session(|record| {
        found = true;
        let written = match format {
            Format::Text => writeln!(out, "{}", record.history_line()),
            Format::Json => serde_json::to_writer(&mut *out, &record)
                .map_err(io::Error::from)
                .and_then(|()| writeln!(out)),
        };
        written.map_err(write_err)
    })?;

    if !found && format == Format::Text {
        writeln!(out, "{}", EMPTY_MESSAGE).map_err(write_err)?;
    }

    out.flush().map_err(write_err)
}

fn write_err(err: io::Error) -> PomoError {
    PomoError::Io {
        context: "Failed to write history".to_string(),
        source: err,
    }
}
