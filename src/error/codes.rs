//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Configuration errors
//! - 2xx: Precondition errors (refused, filesystem untouched)
//! - 3xx: Transport errors (git subprocess)
//! - 4xx: Registry errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `DirtyWorkTree` -> E201).
/// Codes are grouped by category for easy identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Configuration errors (1xx)
    // ========================================
    /// E101: Repository source is empty or cannot be normalized
    SourceInvalid,
    /// E102: Config file has invalid syntax or values
    ConfigInvalid,
    /// E103: Requested integration target is not known
    TargetUnknown,

    // ========================================
    // Precondition errors (2xx)
    // ========================================
    /// E201: Central working copy has uncommitted changes
    DirtyWorkTree,
    /// E202: A non-matching path occupies a planned link location
    PathConflict,
    /// E203: Refusing to edit a shared file through a symlink
    SymlinkedFile,
    /// E204: Occupant escapes the directory it is meant to shadow
    ContainmentViolation,
    /// E205: One or more steps of an install/upgrade run failed
    RunIncomplete,

    // ========================================
    // Transport errors (3xx)
    // ========================================
    /// E301: git subprocess reported failure
    GitFailed,

    // ========================================
    // Registry errors (4xx)
    // ========================================
    /// E401: Registry entry was not found
    EntryNotFound,
    /// E402: Manifest frontmatter could not be parsed
    FrontmatterInvalid,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: I/O operation failed
    IoError,
    /// E902: Serialization failed
    SerializationError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    #[must_use]
    pub const fn numeric(self) -> u16 {
        match self {
            Self::SourceInvalid => 101,
            Self::ConfigInvalid => 102,
            Self::TargetUnknown => 103,
            Self::DirtyWorkTree => 201,
            Self::PathConflict => 202,
            Self::SymlinkedFile => 203,
            Self::ContainmentViolation => 204,
            Self::RunIncomplete => 205,
            Self::GitFailed => 301,
            Self::EntryNotFound => 401,
            Self::FrontmatterInvalid => 402,
            Self::IoError => 901,
            Self::SerializationError => 902,
        }
    }

    /// Get the category name for this error.
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::SourceInvalid | Self::ConfigInvalid | Self::TargetUnknown => "config",
            Self::DirtyWorkTree
            | Self::PathConflict
            | Self::SymlinkedFile
            | Self::ContainmentViolation
            | Self::RunIncomplete => "precondition",
            Self::GitFailed => "transport",
            Self::EntryNotFound | Self::FrontmatterInvalid => "registry",
            Self::IoError | Self::SerializationError => "internal",
        }
    }

    /// Whether re-running after operator action is expected to succeed.
    #[must_use]
    pub const fn is_recoverable(self) -> bool {
        !matches!(self, Self::IoError | Self::SerializationError)
    }

    /// Actionable recovery hint for this code.
    #[must_use]
    pub const fn suggestion(self) -> &'static str {
        match self {
            Self::SourceInvalid => "Pass --repo owner/name or a full git URL",
            Self::ConfigInvalid => "Fix the config file and re-run",
            Self::TargetUnknown => "Use one of: codex, kilocode, opencode",
            Self::DirtyWorkTree => {
                "Commit or stash changes in the central repo, or re-run with --force"
            }
            Self::PathConflict => {
                "Move the existing path out of the way, or re-run with --force to replace it"
            }
            Self::SymlinkedFile => "Re-run with --force to edit through the symlink",
            Self::ContainmentViolation => "Remove the conflicting sibling path manually",
            Self::RunIncomplete => "Inspect the failed steps in the report and re-run",
            Self::GitFailed => "Inspect the git error text; check network and credentials",
            Self::EntryNotFound => "Run 'sp skills list' to see available names",
            Self::FrontmatterInvalid => "Fix the leading --- frontmatter block in the manifest",
            Self::IoError | Self::SerializationError => "Re-run; report a bug if it persists",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.numeric())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_codes_are_unique() {
        let codes = [
            ErrorCode::SourceInvalid,
            ErrorCode::ConfigInvalid,
            ErrorCode::TargetUnknown,
            ErrorCode::DirtyWorkTree,
            ErrorCode::PathConflict,
            ErrorCode::SymlinkedFile,
            ErrorCode::ContainmentViolation,
            ErrorCode::RunIncomplete,
            ErrorCode::GitFailed,
            ErrorCode::EntryNotFound,
            ErrorCode::FrontmatterInvalid,
            ErrorCode::IoError,
            ErrorCode::SerializationError,
        ];
        let mut numerics: Vec<u16> = codes.iter().map(|c| c.numeric()).collect();
        numerics.sort_unstable();
        numerics.dedup();
        assert_eq!(numerics.len(), codes.len());
    }

    #[test]
    fn display_uses_e_prefix() {
        assert_eq!(ErrorCode::DirtyWorkTree.to_string(), "E201");
    }

    #[test]
    fn serializes_screaming_snake_case() {
        let json = serde_json::to_string(&ErrorCode::PathConflict).unwrap();
        assert_eq!(json, "\"PATH_CONFLICT\"");
    }
}
