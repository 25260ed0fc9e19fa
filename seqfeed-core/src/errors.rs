use thiserror::Error;

/// Errors raised while building or advancing sequence sources.
///
/// All structural problems (lengths, shapes, column requests, label counts) are
/// reported when a source or collection is constructed, never mid-stream.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Sequences of different lengths in {context}: found {expected} and {found}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Empty source: {0}")]
    EmptySource(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Error parsing {path} at line {line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },

    #[error("Reference lookup failed: {0}")]
    Reference(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DatasetError {
    pub fn parse<P: std::fmt::Display, R: Into<String>>(path: P, line: usize, reason: R) -> Self {
        DatasetError::Parse {
            path: path.to_string(),
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatasetError>;
