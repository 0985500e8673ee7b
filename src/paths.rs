// src/paths.rs

//! Ordered path-list utilities: normalization, deduplication, and
//! priority-preserving merges
//!
//! Search paths arrive from several sources (environment overrides, platform
//! defaults, pkg-config output) and the same directory is often spelled more
//! than once, with or without a trailing separator. Everything here keeps the
//! first occurrence and drops later duplicates, so earlier (higher-priority)
//! sources always win.

use std::collections::HashSet;
use std::hash::Hash;
use std::path::{Component, Path, PathBuf};

/// Remove later duplicates from a sequence, preserving first-seen order
pub fn uniq<T: Eq + Hash + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert((*item).clone()))
        .cloned()
        .collect()
}

/// Normalize a path spelling for comparison: collapse redundant separators
/// and `.` components and drop trailing separators. Does not touch `..` or
/// resolve symlinks.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        out
    }
}

/// Deduplicate an ordered path list, treating platform-equivalent spellings
/// as equal. Output carries the normalized spelling; idempotent.
pub fn dedupe(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(paths.len());
    for path in paths {
        let normalized = normalize(path);
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    }
    out
}

/// Concatenate path lists in argument order, then dedupe. Same inputs in the
/// same order always yield the same output order.
pub fn merge(lists: &[Vec<PathBuf>]) -> Vec<PathBuf> {
    let mut all = Vec::new();
    for list in lists {
        all.extend_from_slice(list);
    }
    dedupe(&all)
}
