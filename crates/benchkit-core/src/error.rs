//! Shared error type across benchkit crates.

use std::path::PathBuf;

use thiserror::Error;

/// Stable error codes, used by the report binary and by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Filesystem failure.
    Io,
    /// JSON encode/decode failure.
    Json,
    /// Configuration rejected by validation.
    InvalidConfig,
    /// Unsupported configuration or schema version.
    UnsupportedVersion,
    /// An expected snapshot file is missing or empty.
    MissingInput,
    /// Anything else.
    Internal,
}

impl ErrorCode {
    /// String representation used in log lines and CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Io => "IO",
            ErrorCode::Json => "JSON",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::MissingInput => "MISSING_INPUT",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, BenchError>;

/// Unified error type used by core and sdk.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("io error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported version")]
    UnsupportedVersion,
    #[error("missing input {}: {hint}", path.display())]
    MissingInput { path: PathBuf, hint: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl BenchError {
    /// Wrap an io error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BenchError::Io {
            path: path.into(),
            source,
        }
    }

    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            BenchError::Io { .. } => ErrorCode::Io,
            BenchError::Json(_) => ErrorCode::Json,
            BenchError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            BenchError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            BenchError::MissingInput { .. } => ErrorCode::MissingInput,
            BenchError::Internal(_) => ErrorCode::Internal,
        }
    }
}
