//! Unified error type for patternlint operations.
//!
//! Rule evaluation itself never fails: an invalid declaration produces
//! diagnostics, not errors. `PatternLintError` covers the edges around the
//! engine: reading sources, loading configuration, and applying fixes.
//!
//! # Error Codes
//!
//! Error codes are assigned by category:
//! - E001-E009: I/O and filesystem errors
//! - E010-E019: Parse errors
//! - E020-E029: Configuration errors
//! - E030-E039: Analysis errors
//! - E060-E069: Fix errors
//!
//! # Example
//!
//! ```rust
//! use patternlint::error::{ErrorCode, PatternLintError};
//!
//! let err = PatternLintError::config("unknown rule id 'TTRESG999'", None);
//! assert_eq!(err.code(), ErrorCode::CONFIG_INVALID);
//! assert!(err.is_user_fixable());
//! ```

use crate::observability::AnalysisPhase;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error code for documentation and programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorCode(&'static str);

impl ErrorCode {
    /// I/O error - file not found
    pub const IO_FILE_NOT_FOUND: ErrorCode = ErrorCode("E001");
    /// I/O error - permission denied
    pub const IO_PERMISSION_DENIED: ErrorCode = ErrorCode("E002");
    /// I/O error - generic
    pub const IO_GENERIC: ErrorCode = ErrorCode("E009");

    /// Parse error - syntax error
    pub const PARSE_SYNTAX: ErrorCode = ErrorCode("E010");
    /// Parse error - invalid encoding
    pub const PARSE_ENCODING: ErrorCode = ErrorCode("E012");

    /// Config error - invalid value
    pub const CONFIG_INVALID: ErrorCode = ErrorCode("E020");
    /// Config error - file not found
    pub const CONFIG_FILE_NOT_FOUND: ErrorCode = ErrorCode("E022");
    /// Config error - unparsable file
    pub const CONFIG_PARSE: ErrorCode = ErrorCode("E023");

    /// Analysis error - generic
    pub const ANALYSIS_GENERIC: ErrorCode = ErrorCode("E039");

    /// Fix error - no fix registered or applicable
    pub const FIX_NOT_AVAILABLE: ErrorCode = ErrorCode("E060");
    /// Fix error - the rewrite would produce malformed syntax
    pub const FIX_MALFORMED: ErrorCode = ErrorCode("E061");
    /// Fix error - re-analysis still reports the fixed diagnostic
    pub const FIX_NOT_CONVERGED: ErrorCode = ErrorCode("E062");

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Error)]
pub enum PatternLintError {
    /// I/O and filesystem errors.
    #[error("[{code}] {message}{}", path_suffix(.path))]
    Io {
        code: ErrorCode,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// The host syntax model could not make sense of a source file.
    #[error("[{code}] {}:{line}:{column}: {message}", .path.display())]
    Parse {
        code: ErrorCode,
        message: String,
        path: PathBuf,
        line: usize,
        column: usize,
    },

    /// Configuration errors.
    #[error("[{code}] {message}{}", path_suffix(.path))]
    Config {
        code: ErrorCode,
        message: String,
        path: Option<PathBuf>,
    },

    /// Analysis pipeline errors.
    #[error("[{code}] {message}")]
    Analysis {
        code: ErrorCode,
        message: String,
        phase: Option<AnalysisPhase>,
    },

    /// A fix could not be produced or did not converge.
    #[error("[{code}] {diagnostic_id}: {message}")]
    Fix {
        code: ErrorCode,
        message: String,
        diagnostic_id: String,
    },
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

impl PatternLintError {
    #[must_use]
    pub fn from_io_error(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::IO_FILE_NOT_FOUND,
            std::io::ErrorKind::PermissionDenied => ErrorCode::IO_PERMISSION_DENIED,
            std::io::ErrorKind::InvalidData => ErrorCode::PARSE_ENCODING,
            _ => ErrorCode::IO_GENERIC,
        };
        Self::Io {
            code,
            message: err.to_string(),
            path,
            source: Some(err),
        }
    }

    #[must_use]
    pub fn parse(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            code: ErrorCode::PARSE_SYNTAX,
            message: message.into(),
            path: path.into(),
            line,
            column,
        }
    }

    #[must_use]
    pub fn config(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_INVALID,
            message: message.into(),
            path,
        }
    }

    #[must_use]
    pub fn config_parse(message: impl Into<String>, path: PathBuf) -> Self {
        Self::Config {
            code: ErrorCode::CONFIG_PARSE,
            message: message.into(),
            path: Some(path),
        }
    }

    #[must_use]
    pub fn analysis(message: impl Into<String>, phase: Option<AnalysisPhase>) -> Self {
        Self::Analysis {
            code: ErrorCode::ANALYSIS_GENERIC,
            message: message.into(),
            phase,
        }
    }

    #[must_use]
    pub fn fix(code: ErrorCode, diagnostic_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fix {
            code,
            message: message.into(),
            diagnostic_id: diagnostic_id.into(),
        }
    }

    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io { code, .. }
            | Self::Parse { code, .. }
            | Self::Config { code, .. }
            | Self::Analysis { code, .. }
            | Self::Fix { code, .. } => *code,
        }
    }

    /// Errors the user can resolve by editing sources or configuration.
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Config { .. })
    }
}

pub type Result<T> = std::result::Result<T, PatternLintError>;
