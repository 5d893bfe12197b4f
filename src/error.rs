//! Typed error handling for symtrim.
//!
//! Provides structured errors that library consumers can match on, with
//! source positions where the failure came from an expression.

use thiserror::Error;

/// Main error type for symtrim operations.
///
/// This provides typed errors that library consumers can match on,
/// unlike opaque `anyhow::Error` types.
#[derive(Error, Debug)]
pub enum SymtrimError {
    /// An entry module named in the configuration cannot be located.
    ///
    /// Fatal: reachability construction aborts before producing output.
    #[error("Configuration error: cannot find entry module '{module}'")]
    Configuration { module: String },

    /// A constant expression could not be evaluated.
    ///
    /// Fatal to the enum being evaluated; other enums register normally.
    #[error("{file}:{line}:{column}: {message}")]
    Evaluation {
        file: String,
        /// Line number (1-indexed)
        line: u32,
        /// Column number (0-indexed)
        column: u32,
        message: String,
    },

    /// Invalid argument provided
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Front-end contract violation (e.g. an alias chain that never
    /// terminates at a non-alias symbol).
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SymtrimError {
    /// Create a configuration error for a missing entry module.
    pub fn configuration(module: impl Into<String>) -> Self {
        Self::Configuration {
            module: module.into(),
        }
    }

    /// Create a positioned evaluation error.
    pub fn evaluation_at(
        file: impl Into<String>,
        line: u32,
        column: u32,
        message: impl Into<String>,
    ) -> Self {
        Self::Evaluation {
            file: file.into(),
            line,
            column,
            message: message.into(),
        }
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable at the pass level.
    ///
    /// Evaluation errors only disable inlining for one enum; configuration
    /// and internal errors abort the whole transform pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Evaluation { .. })
    }

    /// Source position of this error, if it has one.
    pub fn location(&self) -> Option<(&str, u32, u32)> {
        match self {
            Self::Evaluation {
                file, line, column, ..
            } => Some((file.as_str(), *line, *column)),
            _ => None,
        }
    }
}

/// Convenience type alias for symtrim results.
pub type SymtrimResult<T> = Result<T, SymtrimError>;
