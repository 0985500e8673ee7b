// src/error.rs

//! Error types for dependency resolution and runtime library loading
//!
//! Probe misses are `Option::None` and mechanism unavailability is an
//! internal control value; only requirement-level and loader-level failures
//! surface here. Resolution failures are aggregated so a user sees every
//! missing dependency in one report instead of fixing them one rebuild at a
//! time.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single requirement could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// Neither the query mechanism nor the probe fallback located the package
    NotFound,
    /// A version was discovered but does not satisfy the constraint
    VersionMismatch { found: String, constraint: String },
    /// Discovered version and constraint version use incomparable formats
    MismatchedFormat { found: String, constraint: String },
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::NotFound => write!(f, "not found"),
            UnresolvedReason::VersionMismatch { found, constraint } => {
                write!(f, "version {} does not satisfy {}", found, constraint)
            }
            UnresolvedReason::MismatchedFormat { found, constraint } => {
                write!(
                    f,
                    "version {} cannot be compared against {}",
                    found, constraint
                )
            }
        }
    }
}

/// One requirement that failed to resolve, with its specific reason
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
    pub name: String,
    pub reason: UnresolvedReason,
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.reason)
    }
}

fn enumerate(failures: &[Unresolved]) -> String {
    failures
        .iter()
        .map(|u| u.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed dependency declaration; caller-fixable, surfaced immediately
    #[error("invalid requirement: {0}")]
    InvalidRequirement(String),

    /// One or more required dependencies missing or version-mismatched after
    /// the full resolution attempt
    #[error("unresolved dependencies: {}", enumerate(.0))]
    Unresolved(Vec<Unresolved>),

    /// The runtime loader found no matching library file under any prefix
    #[error("library '{logical_name}' of package '{package}' not found under any known prefix")]
    LibraryNotFound {
        package: String,
        logical_name: String,
    },

    /// A located library file was rejected by the runtime linker
    #[error("failed to load library {}: {reason}", path.display())]
    LibraryLoad { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
