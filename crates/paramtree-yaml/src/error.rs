//! Errors raised while turning YAML text into a dynamic value.

use thiserror::Error;
use yaml_rust2::ScanError;
use yaml_rust2::scanner::Marker;

/// A 1-based line and column in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };
}

impl From<&Marker> for Position {
    fn from(marker: &Marker) -> Self {
        Position {
            line: marker.line(),
            column: marker.col() + 1,
        }
    }
}

/// Why ingestion of a document failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    /// The text is not well-formed YAML.
    #[error("{line}:{column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// The event stream cannot be represented as a dynamic value.
    #[error("{line}:{column}: {message}")]
    Structure {
        message: String,
        line: usize,
        column: usize,
    },

    /// The text could not be read.
    #[error("{message}")]
    Read { message: String },
}

impl IngestError {
    pub(crate) fn structure(at: Position, message: impl Into<String>) -> Self {
        IngestError::Structure {
            message: message.into(),
            line: at.line,
            column: at.column,
        }
    }

    /// Message handed to the type error strategy.
    pub fn report(&self) -> String {
        match self {
            IngestError::Parse { .. } => format!("failed to parse YAML: {}", self),
            IngestError::Structure { .. } => format!("failed to convert YAML: {}", self),
            IngestError::Read { .. } => format!("failed to read YAML: {}", self),
        }
    }
}

impl From<ScanError> for IngestError {
    fn from(err: ScanError) -> Self {
        let at = Position::from(err.marker());
        IngestError::Parse {
            message: err.info().to_owned(),
            line: at.line,
            column: at.column,
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::Read {
            message: err.to_string(),
        }
    }
}
