// src/lib.rs

//! nativedep: native build dependency & library resolution
//!
//! Resolves compiled-library dependencies for collections of interdependent
//! packages and emits the metadata a downstream compiler invocation needs:
//! include/library search paths, link names, and extra compiler/linker
//! flags, discovered via pkg-config when it is available and via direct
//! probing of conventional install prefixes when it is not.
//!
//! # Architecture
//!
//! - Declarations normalize once into canonical, immutable [`Requirement`]s
//! - pkg-config first, prefix probing second, per requirement
//! - No fail-fast: one aggregated report enumerates every unresolved
//!   requirement and its reason
//! - Merged output is deduplicated and deterministic, earlier requirements
//!   taking precedence on duplicates
//! - The emitted build-description fragment is a stable byte-for-byte
//!   contract with the external compiler invocation

pub mod emitter;
mod error;
pub mod paths;
pub mod pkgconfig;
pub mod probe;
pub mod requirement;
pub mod resolver;
pub mod version;

#[cfg(unix)]
pub mod loader;

pub use error::{Error, Result, Unresolved, UnresolvedReason};
pub use pkgconfig::{PackageQuery, PkgConfigData, PkgConfigTool, QueryOutcome};
pub use probe::{LibraryLocation, find_executable, find_header, find_library};
pub use requirement::{RawRequirement, Requirement, normalize};
pub use resolver::{
    Origin, PREFIX_ENV, ResolvedPackage, ResolvedSet, Resolver, SearchPrefixes, link_name,
};
pub use version::{Constraint, ConstraintOp, PkgVersion};

#[cfg(unix)]
pub use loader::{LibraryCache, LibraryHandle};
