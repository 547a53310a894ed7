//! Error types for the engine
//!
//! Resource failures (`EngineError`) abort a run and are returned to the caller.
//! Script authoring mistakes (`ScriptError`) never leave the interpreter loop: they
//! are wrapped in a [`Diagnostic`] and reported while execution moves on.

use crate::host::plugin::PluginError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Resource and environment errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot read script {}: {source}", path.display())]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read save file {}: {source}", path.display())]
    SaveRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write save file {}: {source}", path.display())]
    SaveWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("logger setup failed: {0}")]
    Logger(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub fn script_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ScriptRead {
            path: path.into(),
            source,
        }
    }

    pub fn save_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SaveRead {
            path: path.into(),
            source,
        }
    }

    pub fn save_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SaveWrite {
            path: path.into(),
            source,
        }
    }
}

/// Mistakes in a script line. Reported, never fatal to the host process.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScriptError {
    #[error("unknown command '{command}'")]
    UnknownCommand { command: String },

    #[error("invalid jump target '{target}'")]
    InvalidJumpTarget { target: String },

    #[error("missing closing quote in '{command}'")]
    MissingQuote { command: String, column: usize },

    #[error("invalid operator '{op}'")]
    InvalidOperator { op: String },

    #[error("malformed '{command}': {reason}")]
    Malformed { command: String, reason: String },

    #[error("choice {index} is out of range (1-{count})")]
    InvalidChoice { index: usize, count: usize },

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl ScriptError {
    pub fn malformed(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            command: command.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_target(target: impl Into<String>) -> Self {
        Self::InvalidJumpTarget {
            target: target.into(),
        }
    }

    /// 1-based column the error points at, when it is known
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::MissingQuote { column, .. } => Some(*column),
            _ => None,
        }
    }
}

/// A script error located at a line of the running script
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based line number
    pub line: usize,
    /// 1-based column, if the error points inside the line
    pub column: Option<usize>,
    pub error: ScriptError,
    /// The offending source line
    pub source: String,
}

impl Diagnostic {
    pub fn new(cursor: usize, source: &str, error: ScriptError) -> Self {
        Self {
            line: cursor + 1,
            column: error.column(),
            error,
            source: source.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.column {
            Some(column) => write!(f, "line {}:{}: {}", self.line, column, self.error),
            None => write!(f, "line {}: {}", self.line, self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_reports_one_based_line_and_column() {
        let error = ScriptError::MissingQuote {
            command: "say".to_string(),
            column: 5,
        };
        let diagnostic = Diagnostic::new(9, "say \"oops", error);

        assert_eq!(diagnostic.line, 10);
        assert_eq!(diagnostic.column, Some(5));
        assert_eq!(
            diagnostic.to_string(),
            "line 10:5: missing closing quote in 'say'"
        );
    }

    #[test]
    fn diagnostic_without_column() {
        let diagnostic = Diagnostic::new(0, "dance", ScriptError::UnknownCommand {
            command: "dance".to_string(),
        });
        assert_eq!(diagnostic.to_string(), "line 1: unknown command 'dance'");
    }
}
