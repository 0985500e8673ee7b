// src/resolver/mod.rs

//! Resolution orchestration
//!
//! Given normalized requirements and a prioritized set of install prefixes,
//! resolves each requirement through the query mechanism (probing prefixes
//! directly when the mechanism is absent or ignorant of the package) and
//! merges the results into one deduplicated, priority-ordered
//! [`ResolvedSet`]. Every requirement is attempted before failure is
//! reported, so a user sees all missing dependencies in one pass.

use crate::error::{Error, Result, Unresolved, UnresolvedReason};
use crate::paths;
use crate::pkgconfig::{PackageQuery, PkgConfigData, QueryOutcome};
use crate::probe;
use crate::requirement::Requirement;
use crate::version::PkgVersion;
use std::env;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Environment variable supplying extra search prefixes, highest priority
/// first, in platform `PATH` syntax
pub const PREFIX_ENV: &str = "NATIVEDEP_PREFIX_PATH";

/// Conventional install roots consulted after any overrides
const DEFAULT_PREFIXES: &[&str] = &["/usr/local", "/usr", "/opt/local"];

/// Ordered install roots considered when the query mechanism yields nothing.
/// Overrides come first; first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPrefixes {
    prefixes: Vec<PathBuf>,
}

impl SearchPrefixes {
    /// Platform defaults only, no environment input
    pub fn platform_defaults() -> Self {
        Self {
            prefixes: DEFAULT_PREFIXES.iter().map(PathBuf::from).collect(),
        }
    }

    /// Overrides read from [`PREFIX_ENV`] prepended ahead of the defaults
    pub fn from_env() -> Self {
        let overrides: Vec<PathBuf> = env::var_os(PREFIX_ENV)
            .map(|value| env::split_paths(&value).collect())
            .unwrap_or_default();
        Self::with_overrides(overrides)
    }

    /// Explicit overrides prepended ahead of the platform defaults
    pub fn with_overrides(overrides: Vec<PathBuf>) -> Self {
        let defaults = DEFAULT_PREFIXES.iter().map(PathBuf::from).collect();
        Self {
            prefixes: paths::merge(&[overrides, defaults]),
        }
    }

    /// Exactly these prefixes, nothing implicit
    pub fn from_dirs(prefixes: Vec<PathBuf>) -> Self {
        Self {
            prefixes: paths::dedupe(&prefixes),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathBuf> {
        self.prefixes.iter()
    }

    /// Conventional library subdirectories of every prefix, in priority order
    pub fn library_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(self.prefixes.len() * 2);
        for prefix in &self.prefixes {
            dirs.push(prefix.join("lib"));
            dirs.push(prefix.join("lib64"));
        }
        paths::dedupe(&dirs)
    }

    /// Conventional include subdirectories of every prefix
    pub fn include_dirs(&self) -> Vec<PathBuf> {
        paths::dedupe(
            &self
                .prefixes
                .iter()
                .map(|prefix| prefix.join("include"))
                .collect::<Vec<_>>(),
        )
    }
}

/// Which mechanism produced a resolved package
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The package-config query mechanism
    PkgConfig,
    /// Direct probing of install prefixes
    Probe,
}

/// Resolution result for one requirement; immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: Option<String>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub link_names: Vec<String>,
    pub extra_cflags: Vec<String>,
    pub extra_ldflags: Vec<String>,
    pub found: bool,
    pub origin: Option<Origin>,
}

impl ResolvedPackage {
    fn not_found(name: &str) -> Self {
        Self {
            name: name.to_string(),
            version: None,
            include_dirs: Vec::new(),
            library_dirs: Vec::new(),
            link_names: Vec::new(),
            extra_cflags: Vec::new(),
            extra_ldflags: Vec::new(),
            found: false,
            origin: None,
        }
    }

    /// Preprocessor defines advertising this package to compiled code:
    /// `HAVE_<NAME>` always, `<NAME>_VERSION` when the version is known
    pub fn defines(&self) -> Vec<(String, Option<String>)> {
        let tag: String = self
            .name
            .to_uppercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        let mut defines = vec![(format!("HAVE_{}", tag), None)];
        if let Some(version) = &self.version {
            defines.push((format!("{}_VERSION", tag), Some(format!("\"{}\"", version))));
        }
        defines
    }
}

/// Aggregate resolution result for one build target. Merged sets are
/// deduplicated and ordered by requirement priority (earlier requirements
/// win on duplicates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSet {
    pub packages: Vec<ResolvedPackage>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub link_names: Vec<String>,
    pub extra_cflags: Vec<String>,
    pub extra_ldflags: Vec<String>,
    /// Optional requirements that could not be located
    pub missing: Vec<Unresolved>,
}

impl ResolvedSet {
    fn absorb(&mut self, package: ResolvedPackage) {
        self.include_dirs = paths::merge(&[
            std::mem::take(&mut self.include_dirs),
            package.include_dirs.clone(),
        ]);
        self.library_dirs = paths::merge(&[
            std::mem::take(&mut self.library_dirs),
            package.library_dirs.clone(),
        ]);
        self.link_names =
            paths::uniq(&[self.link_names.clone(), package.link_names.clone()].concat());
        self.extra_cflags =
            paths::uniq(&[self.extra_cflags.clone(), package.extra_cflags.clone()].concat());
        self.extra_ldflags =
            paths::uniq(&[self.extra_ldflags.clone(), package.extra_ldflags.clone()].concat());
        self.packages.push(package);
    }
}

/// Best-effort linker token for a package name: `libfoo` links as `foo`
pub fn link_name(package: &str) -> &str {
    match package.strip_prefix("lib") {
        Some(rest) if !rest.is_empty() => rest,
        _ => package,
    }
}

/// Resolution orchestrator. Owns the injected query mechanism and the search
/// prefixes; each `resolve` call produces a fresh [`ResolvedSet`].
pub struct Resolver {
    query: Box<dyn PackageQuery>,
    prefixes: SearchPrefixes,
}

impl Resolver {
    pub fn new(query: Box<dyn PackageQuery>, prefixes: SearchPrefixes) -> Self {
        Self { query, prefixes }
    }

    pub fn prefixes(&self) -> &SearchPrefixes {
        &self.prefixes
    }

    /// Resolve every requirement in order, aggregating failures instead of
    /// failing fast. Fails with [`Error::Unresolved`] naming every required
    /// requirement that could not be satisfied; optional misses are recorded
    /// on the returned set.
    pub fn resolve(&self, requirements: &[Requirement]) -> Result<ResolvedSet> {
        let mut set = ResolvedSet::default();
        let mut failures = Vec::new();

        for requirement in requirements {
            match self.resolve_one(requirement) {
                Ok(package) => {
                    debug!(
                        "resolved {} via {:?} (version {})",
                        requirement.name,
                        package.origin,
                        package.version.as_deref().unwrap_or("unknown")
                    );
                    set.absorb(package);
                }
                Err(reason) if requirement.optional => {
                    debug!(
                        "optional requirement {} absent: {}",
                        requirement.name, reason
                    );
                    set.missing.push(Unresolved {
                        name: requirement.name.clone(),
                        reason,
                    });
                    set.packages
                        .push(ResolvedPackage::not_found(&requirement.name));
                }
                Err(reason) => {
                    warn!("unresolved requirement {}: {}", requirement.name, reason);
                    failures.push(Unresolved {
                        name: requirement.name.clone(),
                        reason,
                    });
                }
            }
        }

        if !failures.is_empty() {
            return Err(Error::Unresolved(failures));
        }
        Ok(set)
    }

    fn resolve_one(
        &self,
        requirement: &Requirement,
    ) -> std::result::Result<ResolvedPackage, UnresolvedReason> {
        match self.query.query(&requirement.name) {
            QueryOutcome::Found(data) => self.from_query(requirement, data),
            QueryOutcome::Unknown => {
                debug!(
                    "query mechanism does not know {}, probing prefixes",
                    requirement.name
                );
                self.from_probe(requirement)
            }
            QueryOutcome::Unavailable => {
                debug!(
                    "query mechanism unavailable for {}, probing prefixes",
                    requirement.name
                );
                self.from_probe(requirement)
            }
        }
    }

    /// Build a resolved package from query-mechanism metadata, enforcing the
    /// version constraint when both sides are known. A mismatch is final:
    /// probing cannot re-validate a version the mechanism already reported.
    fn from_query(
        &self,
        requirement: &Requirement,
        data: PkgConfigData,
    ) -> std::result::Result<ResolvedPackage, UnresolvedReason> {
        if let (Some(constraint), Some(version)) = (&requirement.constraint, &data.version) {
            let found =
                PkgVersion::parse(version).map_err(|_| UnresolvedReason::MismatchedFormat {
                    found: version.clone(),
                    constraint: constraint.to_string(),
                })?;
            constraint.check(&found)?;
        }

        Ok(ResolvedPackage {
            name: requirement.name.clone(),
            version: data.version,
            include_dirs: paths::dedupe(&data.include_dirs),
            library_dirs: paths::dedupe(&data.library_dirs),
            link_names: paths::uniq(&data.link_names),
            extra_cflags: paths::uniq(&data.extra_cflags),
            extra_ldflags: paths::uniq(&data.extra_ldflags),
            found: true,
            origin: Some(Origin::PkgConfig),
        })
    }

    /// Synthesize a resolved package by locating the library file directly
    /// under the search prefixes
    fn from_probe(
        &self,
        requirement: &Requirement,
    ) -> std::result::Result<ResolvedPackage, UnresolvedReason> {
        let logical = link_name(&requirement.name);

        let Some(location) = probe::find_library(logical, &self.prefixes.library_dirs()) else {
            return Err(UnresolvedReason::NotFound);
        };

        // Constraint check against a filename-encoded version, when present
        if let (Some(constraint), Some(version)) = (&requirement.constraint, &location.version) {
            if let Ok(found) = PkgVersion::parse(version) {
                constraint.check(&found)?;
            }
        }

        // Only prefixes that actually carry a matching header contribute an
        // include dir; a library-only hit must not invent include paths.
        let mut include_dirs = Vec::new();
        for prefix in self.prefixes.iter() {
            let include = prefix.join("include");
            let candidates = [format!("{}.h", logical), format!("{}.h", requirement.name)];
            if candidates
                .iter()
                .any(|header| probe::find_header(header, std::slice::from_ref(&include)).is_some())
            {
                include_dirs.push(include);
            }
        }

        let library_dirs: Vec<PathBuf> = location
            .path
            .parent()
            .map(|dir| vec![dir.to_path_buf()])
            .unwrap_or_default();

        Ok(ResolvedPackage {
            name: requirement.name.clone(),
            version: location.version.clone(),
            include_dirs: paths::dedupe(&include_dirs),
            library_dirs,
            link_names: vec![logical.to_string()],
            extra_cflags: Vec::new(),
            extra_ldflags: Vec::new(),
            found: true,
            origin: Some(Origin::Probe),
        })
    }
}
