// src/requirement.rs

//! Requirement normalization
//!
//! Dependency declarations arrive in loose shapes: a bare package name, a
//! name with an inline comparison ("libfoo >= 1.2"), or an already-split
//! (name, operator, version) triple. This module is the single point that
//! translates those into the canonical, immutable [`Requirement`] used
//! everywhere else; malformed entries are rejected up front.

use crate::error::{Error, Result};
use crate::version::{Constraint, ConstraintOp};
use regex::Regex;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

/// A dependency declaration as accepted from callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRequirement {
    /// Bare package name, any version
    Name(String),
    /// Name with an inline comparison, e.g. "libfoo >= 1.2"
    Spec(String),
    /// Pre-split (name, operator, version) form
    Split {
        name: String,
        op: String,
        version: String,
    },
}

/// Canonical requirement consumed by the resolver; immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraint: Option<Constraint>,
    /// Soft dependency: absence is recorded, not fatal
    pub optional: bool,
}

impl Requirement {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidRequirement(
                "requirement name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.trim().to_string(),
            constraint: None,
            optional: false,
        })
    }

    pub fn with_constraint(
        name: impl Into<String>,
        op: ConstraintOp,
        version: &str,
    ) -> Result<Self> {
        let mut requirement = Self::new(name)?;
        requirement.constraint = Some(Constraint::new(op, version)?);
        Ok(requirement)
    }

    /// Mark this requirement as optional (soft)
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            Some(constraint) => write!(f, "{} {}", self.name, constraint),
            None => write!(f, "{}", self.name),
        }
    }
}

impl From<&Requirement> for RawRequirement {
    fn from(requirement: &Requirement) -> Self {
        match &requirement.constraint {
            Some(constraint) => RawRequirement::Split {
                name: requirement.name.clone(),
                op: constraint.op.as_str().to_string(),
                version: constraint.version.as_str().to_string(),
            },
            None => RawRequirement::Name(requirement.name.clone()),
        }
    }
}

fn spec_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // The version token must not start with a comparison character, so a
        // mistyped operator ("libfoo=>1.2") fails to parse instead of being
        // read as "=" against the version ">1.2"
        Regex::new(r"^\s*([^\s<>=]+)\s*(?:(==|=|>=|<=|>|<)\s*([^\s<>=]\S*))?\s*$")
            .expect("valid requirement pattern")
    })
}

fn parse_spec(spec: &str) -> Result<Requirement> {
    let captures = spec_pattern().captures(spec).ok_or_else(|| {
        Error::InvalidRequirement(format!("cannot parse requirement '{}'", spec))
    })?;

    let name = &captures[1];
    match (captures.get(2), captures.get(3)) {
        (Some(op), Some(version)) => {
            let op = ConstraintOp::parse(op.as_str()).ok_or_else(|| {
                Error::InvalidRequirement(format!(
                    "unrecognized comparison operator '{}' in requirement '{}'",
                    op.as_str(),
                    spec
                ))
            })?;
            Requirement::with_constraint(name, op, version.as_str())
        }
        _ => Requirement::new(name),
    }
}

/// Normalize a heterogeneous list of declarations into canonical
/// requirements. Output order matches input order (priority-significant);
/// duplicate package names and malformed entries are rejected.
pub fn normalize(raw: &[RawRequirement]) -> Result<Vec<Requirement>> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for entry in raw {
        let requirement = match entry {
            RawRequirement::Name(name) => Requirement::new(name.as_str())?,
            RawRequirement::Spec(spec) => parse_spec(spec)?,
            RawRequirement::Split { name, op, version } => {
                let op = ConstraintOp::parse(op).ok_or_else(|| {
                    Error::InvalidRequirement(format!(
                        "unrecognized comparison operator '{}' in requirement for '{}'",
                        op, name
                    ))
                })?;
                Requirement::with_constraint(name.as_str(), op, version)?
            }
        };

        if !seen.insert(requirement.name.clone()) {
            return Err(Error::InvalidRequirement(format!(
                "package '{}' requested more than once",
                requirement.name
            )));
        }
        out.push(requirement);
    }

    Ok(out)
}
