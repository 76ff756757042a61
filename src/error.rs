//! Typed errors for index encoding and decoding.
//!
//! Codec and sink functions return [`SeqminiError`] so that callers can tell a
//! malformed index apart from an unopenable destination. The orchestration
//! layer wraps these in `anyhow` with context; recover the typed error with
//! `err.downcast_ref::<SeqminiError>()`.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Where in an index stream a corrupt record starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPosition {
    /// Byte offset into a binary index
    Byte(u64),
    /// 1-based line number of a text index
    Line(usize),
}

impl fmt::Display for StreamPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamPosition::Byte(offset) => write!(f, "byte {}", offset),
            StreamPosition::Line(line) => write!(f, "line {}", line),
        }
    }
}

#[derive(Error, Debug)]
pub enum SeqminiError {
    /// Malformed or contradictory options
    #[error("Usage error: {message}")]
    Usage { message: String },

    /// An output destination could not be opened for writing
    #[error("Failed to open output {}: {source}", path.display())]
    SinkOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A malformed binary or text record was found while decoding
    #[error("Corrupt index stream at {position}: {message}")]
    CorruptStream {
        position: StreamPosition,
        message: String,
    },

    /// Read/write failure unrelated to record structure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SeqminiError>;

impl SeqminiError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    pub fn sink_open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SinkOpen {
            path: path.into(),
            source,
        }
    }

    /// Corrupt binary record, located by byte offset of the record start
    pub fn corrupt_at_byte(offset: u64, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            position: StreamPosition::Byte(offset),
            message: message.into(),
        }
    }

    /// Corrupt text record, located by 1-based line number
    pub fn corrupt_at_line(line: usize, message: impl Into<String>) -> Self {
        Self::CorruptStream {
            position: StreamPosition::Line(line),
            message: message.into(),
        }
    }

    pub fn is_corrupt_stream(&self) -> bool {
        matches!(self, Self::CorruptStream { .. })
    }
}
