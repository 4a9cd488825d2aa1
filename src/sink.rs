//! Append-only log of available handles
//!
//! Every write opens the file, appends one line, flushes and closes it again,
//! so no handle is held between records and readers of the file never see a
//! previously written line change.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::filter::{Candidate, split_lines};

pub const DEFAULT_OUTPUT_PATH: &str = "available_usernames.txt";

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to append {candidate} to {path}: {source}")]
    Append {
        candidate: String,
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Destination for confirmed-available handles
pub trait ResultSink {
    fn record_available(&self, candidate: &Candidate) -> Result<(), SinkError>;
}

/// Text file sink, one handle per line
///
/// Each record is a blocking open/append/fsync. Async callers on a
/// multi-threaded runtime wrap it in `tokio::task::block_in_place`.
#[derive(Debug, Clone)]
pub struct AppendFileSink {
    path: PathBuf,
}

impl AppendFileSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Handles recorded so far, oldest first. A missing file is empty.
    pub fn entries(&self) -> Result<Vec<String>, SinkError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(SinkError::Read {
                    path: self.path.display().to_string(),
                    source,
                });
            }
        };

        Ok(split_lines(&text)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn append_line(&self, line: &str) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        file.flush()?;
        file.sync_data()
    }
}

impl Default for AppendFileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

impl ResultSink for AppendFileSink {
    fn record_available(&self, candidate: &Candidate) -> Result<(), SinkError> {
        self.append_line(candidate.as_str())
            .map_err(|source| SinkError::Append {
                candidate: candidate.to_string(),
                path: self.path.display().to_string(),
                source,
            })?;

        debug!(%candidate, path = %self.path.display(), "Recorded available handle");
        Ok(())
    }
}
