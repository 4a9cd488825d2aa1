//! Candidate handle validation
//!
//! Raw input lines are trimmed and kept only when they consist solely of
//! ASCII letters, digits and underscores. Order and duplicates are preserved.

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static CANDIDATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("candidate pattern is a valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidCandidate {
    #[error("candidate is empty")]
    Empty,
    #[error("candidate contains characters outside [A-Za-z0-9_]: {0:?}")]
    Charset(String),
}

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("failed to read candidates from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A validated handle eligible for lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Candidate(String);

impl Candidate {
    /// Trim and validate a raw line
    pub fn parse(raw: &str) -> Result<Self, InvalidCandidate> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidCandidate::Empty);
        }
        if !CANDIDATE_PATTERN.is_match(trimmed) {
            return Err(InvalidCandidate::Charset(trimmed.to_string()));
        }
        Ok(Candidate(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keep only the lines that form valid candidates
pub fn filter_candidates<I, S>(lines: I) -> Vec<Candidate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| Candidate::parse(line.as_ref()).ok())
        .collect()
}

/// Split text on `\n`, `\r\n` or a bare `\r`
pub fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split(['\n', '\r'])
}

/// Read a candidate file and filter its lines
///
/// Bytes that are not valid UTF-8 are replaced, which makes the affected
/// lines fail validation instead of failing the whole read.
pub fn read_candidates<P: AsRef<Path>>(path: P) -> Result<Vec<Candidate>, FilterError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| FilterError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let text = String::from_utf8_lossy(&bytes);
    let total_lines = split_lines(&text).filter(|l| !l.is_empty()).count();
    let candidates = filter_candidates(split_lines(&text));

    debug!(
        path = %path.display(),
        total_lines,
        kept = candidates.len(),
        "Filtered candidate file"
    );

    Ok(candidates)
}
