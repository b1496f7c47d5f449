//! Structured errors for per-file update results.
//!
//! A batch run never aborts because one file failed; each failure is captured
//! as an [`UpdateError`] and reported alongside the successful files.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Input errors
    ReadFailed,
    TemplateReadFailed,

    // Catch-up could not determine where to start
    NoLastUpdate,

    // Output errors
    WriteFailed,
}

/// Structured error for one document update.
#[derive(Debug, Serialize)]
pub struct UpdateError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl UpdateError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
            details: None,
        }
    }

    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.display().to_string());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Convenience constructors

    pub fn read_failed(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ReadFailed,
            format!("Cannot read {}", path.display()),
        )
        .with_path(path)
        .with_details(err.to_string())
    }

    pub fn template_read_failed(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::TemplateReadFailed,
            format!("Cannot read recurring templates {}", path.display()),
        )
        .with_path(path)
        .with_details(err.to_string())
    }

    pub fn write_failed(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::WriteFailed,
            format!("Cannot write {}", path.display()),
        )
        .with_path(path)
        .with_details(err.to_string())
    }

    pub fn no_last_update(path: &Path) -> Self {
        Self::new(
            ErrorCode::NoLastUpdate,
            format!(
                "Cannot tell when {} was last updated; run once without catch-up",
                path.display()
            ),
        )
        .with_path(path)
    }
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.details {
            Some(ref details) => write!(f, "{}: {}", self.message, details),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for UpdateError {}

/// Result type for update operations.
pub type UpdateResult<T> = std::result::Result<T, UpdateError>;
