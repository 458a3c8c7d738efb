//! Caller-visible errors for the file readers.
//!
//! Most malformed input never surfaces here: readers log the offending
//! record and move on. A [`ReadError`] means the read as a whole failed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parser::ParseError;

/// A record-level failure with enough context to locate it in the file.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line_number}: {source} (line: '{line}')")]
pub struct LineError {
    /// One-based line number within the file.
    pub line_number: usize,
    /// The offending line, trimmed.
    pub line: String,
    #[source]
    pub source: ParseError,
}

impl LineError {
    pub fn new(line_number: usize, line: &str, source: ParseError) -> Self {
        Self {
            line_number,
            line: line.trim().to_string(),
            source,
        }
    }
}

/// Errors that abort a whole read.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed record in {}: {source}", path.display())]
    Line {
        path: PathBuf,
        #[source]
        source: LineError,
    },

    #[error("Failed to read spreadsheet {}: {message}", path.display())]
    Spreadsheet { path: PathBuf, message: String },
}

/// Result type for whole-file reads.
pub type ReadResult<T> = Result<T, ReadError>;

/// Read a whole file into memory, mapping a missing file to [`ReadError::NotFound`].
pub(crate) fn read_file(path: &Path) -> ReadResult<String> {
    fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ReadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ReadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}
