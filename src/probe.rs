// src/probe.rs

//! Filesystem probing for executables, native libraries, and headers
//!
//! Absence is a normal outcome (`None`), never an error: the caller decides
//! whether a miss is fatal. Library lookup knows the platform filename
//! decorations (lib-prefix, shared/static suffixes, version suffixes) and
//! prefers dynamic over static and higher versions over lower ones.

use crate::version::PkgVersion;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A library file located on disk, with any version encoded in its filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryLocation {
    pub path: PathBuf,
    /// Best-effort version parsed from a filename suffix (e.g. libfoo.so.1.2)
    pub version: Option<String>,
}

/// Locate an executable on the process search path, applying platform
/// executable-suffix rules
pub fn find_executable(name: &str) -> Option<PathBuf> {
    match which::which(name) {
        Ok(path) => {
            debug!("found executable {} at {}", name, path.display());
            Some(path)
        }
        Err(_) => None,
    }
}

/// Locate a library by logical name across candidate directories, first
/// match wins
pub fn find_library(logical_name: &str, search_dirs: &[PathBuf]) -> Option<LibraryLocation> {
    find_library_version(logical_name, None, search_dirs)
}

/// Like [`find_library`], but preferring candidates whose filename carries
/// the wanted version suffix
pub fn find_library_version(
    logical_name: &str,
    wanted_version: Option<&str>,
    search_dirs: &[PathBuf],
) -> Option<LibraryLocation> {
    for dir in search_dirs {
        if let Some(location) = scan_directory(logical_name, wanted_version, dir) {
            debug!(
                "found library {} at {}",
                logical_name,
                location.path.display()
            );
            return Some(location);
        }
    }
    None
}

/// Locate a header file across candidate directories; no version handling
pub fn find_header(name: &str, search_dirs: &[PathBuf]) -> Option<PathBuf> {
    for dir in search_dirs {
        let candidate = dir.join(name);
        if candidate.is_file() {
            debug!("found header {} at {}", name, candidate.display());
            return Some(candidate);
        }
    }
    None
}

/// Try each filename pattern for one directory: exact wanted version first,
/// then the unversioned dynamic name, then version-suffixed dynamic variants
/// (highest version first), then static.
fn scan_directory(
    logical_name: &str,
    wanted_version: Option<&str>,
    dir: &Path,
) -> Option<LibraryLocation> {
    if let Some(version) = wanted_version {
        let candidate = dir.join(versioned_dynamic_name(logical_name, version));
        if candidate.is_file() {
            return Some(LibraryLocation {
                path: candidate,
                version: Some(version.to_string()),
            });
        }
    }

    let candidate = dir.join(dynamic_name(logical_name));
    if candidate.is_file() {
        return Some(LibraryLocation {
            path: candidate,
            version: None,
        });
    }

    if let Some(location) = best_versioned_candidate(logical_name, dir) {
        return Some(location);
    }

    let candidate = dir.join(static_name(logical_name));
    if candidate.is_file() {
        return Some(LibraryLocation {
            path: candidate,
            version: None,
        });
    }

    None
}

/// Scan a directory for version-suffixed dynamic variants and pick the
/// highest version
fn best_versioned_candidate(logical_name: &str, dir: &Path) -> Option<LibraryLocation> {
    let entries = fs::read_dir(dir).ok()?;

    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if let Some(version) = version_suffix(file_name, logical_name) {
            let path = entry.path();
            if path.is_file() {
                candidates.push((version, path));
            }
        }
    }

    candidates.sort_by(|a, b| compare_version_strings(&b.0, &a.0).then_with(|| a.1.cmp(&b.1)));
    candidates
        .into_iter()
        .next()
        .map(|(version, path)| LibraryLocation {
            path,
            version: Some(version),
        })
}

fn compare_version_strings(a: &str, b: &str) -> Ordering {
    match (PkgVersion::parse(a), PkgVersion::parse(b)) {
        (Ok(va), Ok(vb)) => va.compare(&vb).unwrap_or_else(|| a.cmp(b)),
        _ => a.cmp(b),
    }
}

fn dynamic_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{name}.dylib")
    } else {
        format!("lib{name}.so")
    }
}

fn versioned_dynamic_name(name: &str, version: &str) -> String {
    if cfg!(windows) {
        format!("{name}-{version}.dll")
    } else if cfg!(target_os = "macos") {
        format!("lib{name}.{version}.dylib")
    } else {
        format!("lib{name}.so.{version}")
    }
}

fn static_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.lib")
    } else {
        format!("lib{name}.a")
    }
}

/// Extract the version suffix from a decorated filename, if this file is a
/// versioned dynamic variant of `logical_name`
fn version_suffix(file_name: &str, logical_name: &str) -> Option<String> {
    if cfg!(windows) {
        return None; // no versioned DLL convention worth matching
    }
    if cfg!(target_os = "macos") {
        let rest = file_name.strip_prefix(&format!("lib{logical_name}."))?;
        let version = rest.strip_suffix(".dylib")?;
        if version.is_empty() {
            return None;
        }
        return Some(version.to_string());
    }
    let version = file_name.strip_prefix(&format!("lib{logical_name}.so."))?;
    if version.is_empty() {
        None
    } else {
        Some(version.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_find_library_absent_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(find_library("nosuchlib", &[dir.path().to_path_buf()]), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_find_library_exact_dynamic_name() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "libfoo.so");

        let location = find_library("foo", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(location.path, dir.path().join("libfoo.so"));
        assert_eq!(location.version, None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_find_library_prefers_highest_version() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "libbar.so.1.2");
        touch(dir.path(), "libbar.so.2.0");
        touch(dir.path(), "libbar.so.1.10");

        let location = find_library("bar", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(location.version.as_deref(), Some("2.0"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_find_library_wanted_version_wins() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "libbar.so");
        touch(dir.path(), "libbar.so.1.2");

        let location =
            find_library_version("bar", Some("1.2"), &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(location.path, dir.path().join("libbar.so.1.2"));
        assert_eq!(location.version.as_deref(), Some("1.2"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_find_library_static_fallback() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "libbaz.a");

        let location = find_library("baz", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(location.path, dir.path().join("libbaz.a"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_find_library_first_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(first.path(), "libqux.so");
        touch(second.path(), "libqux.so");

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let location = find_library("qux", &dirs).unwrap();
        assert_eq!(location.path, first.path().join("libqux.so"));
    }

    #[test]
    fn test_find_header() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("blitz")).unwrap();
        touch(&dir.path().join("blitz"), "array.h");

        let found = find_header("blitz/array.h", &[dir.path().to_path_buf()]).unwrap();
        assert_eq!(found, dir.path().join("blitz/array.h"));
        assert_eq!(find_header("missing.h", &[dir.path().to_path_buf()]), None);
    }

    #[test]
    fn test_find_executable_missing() {
        assert_eq!(find_executable("definitely-not-a-real-tool-xyz"), None);
    }
}
