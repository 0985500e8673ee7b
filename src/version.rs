// src/version.rs

//! Version handling and constraint satisfaction for native package
//! requirements
//!
//! Discovered versions come from pkg-config (`--modversion`) or from library
//! filename suffixes and are frequently not semver-compliant. Comparison is
//! semver-strict when both sides parse (short numeric forms like "1.2" are
//! padded to "1.2.0" first), lexicographic when neither side parses, and
//! refused when the formats are mixed: a mixed pairing is reported as a
//! mismatched format rather than guessed at.

use crate::error::{Error, Result, UnresolvedReason};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;

/// A discovered or requested package version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkgVersion {
    raw: String,
    parsed: Option<Version>,
}

impl PkgVersion {
    pub fn parse(s: &str) -> Result<Self> {
        let raw = s.trim();
        if raw.is_empty() {
            return Err(Error::InvalidRequirement(
                "empty version string".to_string(),
            ));
        }
        Ok(Self {
            raw: raw.to_string(),
            parsed: Self::to_semver(raw),
        })
    }

    /// Best-effort strict parse, padding short numeric forms ("7", "1.2")
    /// out to major.minor.patch
    fn to_semver(s: &str) -> Option<Version> {
        if let Ok(v) = Version::parse(s) {
            return Some(v);
        }

        let parts: Vec<&str> = s.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return None;
        }

        let mut numbers = [0u64; 3];
        for (i, part) in parts.iter().enumerate() {
            numbers[i] = part.parse::<u64>().ok()?;
        }
        Some(Version::new(numbers[0], numbers[1], numbers[2]))
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this version has a strict semantic interpretation
    pub fn is_semver(&self) -> bool {
        self.parsed.is_some()
    }

    /// Compare two versions. `None` means the formats are incomparable
    /// (exactly one side is semantic).
    pub fn compare(&self, other: &PkgVersion) -> Option<Ordering> {
        match (&self.parsed, &other.parsed) {
            (Some(a), Some(b)) => Some(a.cmp(b)),
            (None, None) => Some(self.raw.cmp(&other.raw)),
            _ => None,
        }
    }
}

impl fmt::Display for PkgVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Recognized version comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintOp {
    Equal,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
}

impl ConstraintOp {
    /// Parse an operator token. Both `==` and `=` spell exact equality.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "==" | "=" => Some(Self::Equal),
            ">" => Some(Self::Greater),
            ">=" => Some(Self::GreaterOrEqual),
            "<" => Some(Self::Less),
            "<=" => Some(Self::LessOrEqual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equal => "==",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::Less => ordering == Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A version comparison a resolved package must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: ConstraintOp,
    pub version: PkgVersion,
}

impl Constraint {
    pub fn new(op: ConstraintOp, version: &str) -> Result<Self> {
        Ok(Self {
            op,
            version: PkgVersion::parse(version)?,
        })
    }

    /// Check a discovered version against this constraint, returning the
    /// retained failure reason on mismatch
    pub fn check(&self, found: &PkgVersion) -> std::result::Result<(), UnresolvedReason> {
        match found.compare(&self.version) {
            Some(ordering) if self.op.accepts(ordering) => Ok(()),
            Some(_) => Err(UnresolvedReason::VersionMismatch {
                found: found.as_str().to_string(),
                constraint: self.to_string(),
            }),
            None => Err(UnresolvedReason::MismatchedFormat {
                found: found.as_str().to_string(),
                constraint: self.to_string(),
            }),
        }
    }

    pub fn satisfies(&self, found: &PkgVersion) -> bool {
        self.check(found).is_ok()
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}
