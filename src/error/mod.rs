//! Error handling for sp.
//!
//! This module provides:
//! - [`SpError`]: The main error enum for all sp operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;

/// Main error type for sp operations.
#[derive(Error, Debug)]
pub enum SpError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid repository source: {0}")]
    SourceInvalid(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unknown integration target: {0}")]
    UnknownTarget(String),

    #[error("Central repo at {path} has uncommitted changes. Re-run with --force to continue.\n{status}")]
    DirtyWorkTree { path: PathBuf, status: String },

    #[error("Refusing to replace existing path without --force: {0}")]
    PathConflict(PathBuf),

    #[error("Refusing to edit symlinked file without --force: {0}")]
    SymlinkedFile(PathBuf),

    #[error("Refusing to remove {occupant}: resolved path is not inside {root}")]
    ContainmentViolation { occupant: PathBuf, root: PathBuf },

    #[error("{mode} did not complete; one or more steps failed")]
    RunIncomplete { mode: String },

    #[error("git {operation} failed: {stderr}")]
    Git { operation: String, stderr: String },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl SpError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::SourceInvalid(_) => ErrorCode::SourceInvalid,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::UnknownTarget(_) => ErrorCode::TargetUnknown,
            Self::DirtyWorkTree { .. } => ErrorCode::DirtyWorkTree,
            Self::PathConflict(_) => ErrorCode::PathConflict,
            Self::SymlinkedFile(_) => ErrorCode::SymlinkedFile,
            Self::ContainmentViolation { .. } => ErrorCode::ContainmentViolation,
            Self::RunIncomplete { .. } => ErrorCode::RunIncomplete,
            Self::Git { .. } => ErrorCode::GitFailed,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Yaml(_) => ErrorCode::FrontmatterInvalid,
            Self::NotFound(_) => ErrorCode::EntryNotFound,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::DirtyWorkTree { path, status } => Some(serde_json::json!({
                "path": path.display().to_string(),
                "status": status,
            })),
            Self::PathConflict(path) | Self::SymlinkedFile(path) => {
                Some(serde_json::json!({ "path": path.display().to_string() }))
            }
            Self::ContainmentViolation { occupant, root } => Some(serde_json::json!({
                "occupant": occupant.display().to_string(),
                "root": root.display().to_string(),
            })),
            Self::Git { operation, stderr } => {
                Some(serde_json::json!({ "operation": operation, "stderr": stderr }))
            }
            Self::UnknownTarget(name) | Self::NotFound(name) => {
                Some(serde_json::json!({ "name": name }))
            }
            Self::RunIncomplete { mode } => Some(serde_json::json!({ "mode": mode })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_sp_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// This type is the robot mode error payload: an agent driving sp can parse
/// it and decide whether a retry, a --force, or operator action is needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "PATH_CONFLICT")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 202)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "precondition", "transport")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from an [`SpError`].
    #[must_use]
    pub fn from_sp_error(err: &SpError) -> Self {
        let code = err.code();
        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion: code.suggestion().to_string(),
            context: err.context(),
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<SpError> for StructuredError {
    fn from(err: SpError) -> Self {
        Self::from_sp_error(&err)
    }
}

impl From<&SpError> for StructuredError {
    fn from(err: &SpError) -> Self {
        Self::from_sp_error(err)
    }
}

/// Result type alias using SpError.
pub type Result<T> = std::result::Result<T, SpError>;
