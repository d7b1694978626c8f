//! Error types for Sextant core.

use std::{error::Error, fmt};

/// Error type for Sextant analysis operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Source text could not be structurally parsed.
    Parse {
        /// 1-indexed line where parsing failed.
        line: usize,
        /// Description of the malformed construct.
        message: String,
    },
    /// A catch-all error with a message.
    Other(String),
}

impl AnalysisError {
    /// Build a parse error for the given line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { line, message } => write!(f, "parse error at line {line}: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for AnalysisError {}

/// Convenience result type for Sextant core.
pub type Result<T> = std::result::Result<T, AnalysisError>;
