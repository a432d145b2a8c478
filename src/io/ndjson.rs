//! NDJSON (Newline Delimited JSON) file processing utilities.
//!
//! Recorded content batches are stored one timestamped entry per line so that
//! a session can be replayed without the remote content source.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{LivemodError, LivemodResult};

/// Generic entry in an NDJSON file with timestamp and data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimestampedEntry<T> {
    /// Unix timestamp when the entry was recorded
    pub timestamp: u64,
    /// The actual data payload
    pub data: T,
}

impl<T> TimestampedEntry<T> {
    /// Wrap `data` with the current Unix timestamp.
    pub fn now(data: T) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp().max(0) as u64,
            data,
        }
    }
}

/// Parse an NDJSON file into a vector of entries.
///
/// Blank lines are skipped. The first malformed line aborts parsing and the
/// error carries its 1-based line number.
pub fn parse_ndjson_file<T>(path: impl AsRef<Path>) -> LivemodResult<Vec<T>>
where
    T: for<'de> Deserialize<'de>,
{
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let entry =
            serde_json::from_str(trimmed).map_err(|e| LivemodError::json(index + 1, e))?;
        entries.push(entry);
    }

    tracing::debug!(
        path = %path.display(),
        entries = entries.len(),
        "📄 NDJSON file parsed"
    );

    Ok(entries)
}

/// Write entries to an NDJSON file, replacing any existing content.
pub fn write_ndjson_file<T: Serialize>(path: impl AsRef<Path>, entries: &[T]) -> LivemodResult<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    for (index, entry) in entries.iter().enumerate() {
        let line = serde_json::to_string(entry).map_err(|e| LivemodError::json(index + 1, e))?;
        writeln!(writer, "{}", line)?;
    }

    writer.flush()?;
    Ok(())
}

/// Append a single entry to an NDJSON file, creating it if needed.
pub fn append_ndjson_entry<T: Serialize>(path: impl AsRef<Path>, entry: &T) -> LivemodResult<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path.as_ref())?;

    let line = serde_json::to_string(entry).map_err(|e| LivemodError::json(0, e))?;
    writeln!(file, "{}", line)?;
    Ok(())
}
