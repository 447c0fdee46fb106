use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading, validating or resolving a neutral map.
#[derive(Debug, Error)]
pub enum NmfError {
    /// Malformed neutral map text.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("unknown boundary condition: \"{0}\"")]
    UnknownBoundaryCondition(String),

    #[error("invalid block dimension ({i}, {j}, {k}): every active axis needs at least 2 nodes")]
    InvalidDimension { i: usize, j: usize, k: usize },

    #[error("{what} index {index} is out of range [{min}, {max}]")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        min: usize,
        max: usize,
    },

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("mismatched one-to-one window: {0}")]
    MismatchedWindow(String),

    #[error("inconsistent topology: {0}")]
    InconsistentTopology(String),

    #[error("{}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl NmfError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn out_of_range(what: &'static str, index: usize, min: usize, max: usize) -> Self {
        Self::IndexOutOfRange {
            what,
            index,
            min,
            max,
        }
    }

    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}

/// Convenience type alias for results using [`NmfError`].
pub type Result<T> = std::result::Result<T, NmfError>;
