//! Error types for synvis.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SynvisError>;

#[derive(Debug, Error)]
pub enum SynvisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A database line did not match the shape of its record kind.
    #[error("parse error at line {line}: {reason}")]
    Parse { line: String, reason: String },

    /// The index file ended in the middle of a block.
    #[error("index file is truncated or corrupt")]
    IndexCorrupt,

    /// Ray is parallel to the plane, or hits it behind the origin.
    #[error("ray does not intersect plane")]
    NoIntersection,

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to open navigation database {path}: {source}")]
    DatabaseOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open index file {path}: {source}")]
    IndexOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record offset {0} does not fit the index format")]
    OffsetOverflow(u64),
}

impl SynvisError {
    pub(crate) fn parse(line: &str, reason: impl Into<String>) -> Self {
        SynvisError::Parse {
            line: line.trim_end().to_string(),
            reason: reason.into(),
        }
    }
}
