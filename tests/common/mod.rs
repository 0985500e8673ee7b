// tests/common/mod.rs

//! Shared test fixtures: a scripted query mechanism and scratch prefix trees.

use nativedep::{PackageQuery, QueryOutcome};
use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Scripted query mechanism. Records the packages asked about, in order;
/// unscripted packages are reported as unknown.
pub struct MockQuery {
    responses: HashMap<String, QueryOutcome>,
    queried: Mutex<Vec<String>>,
}

impl MockQuery {
    pub fn new(responses: Vec<(&str, QueryOutcome)>) -> Arc<Self> {
        Arc::new(Self {
            responses: responses
                .into_iter()
                .map(|(name, outcome)| (name.to_string(), outcome))
                .collect(),
            queried: Mutex::new(Vec::new()),
        })
    }

    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

/// Local wrapper so the foreign `PackageQuery` trait can be implemented
/// for a shared `MockQuery` handle (orphan rule).
pub struct MockHandle(pub Arc<MockQuery>);

impl PackageQuery for MockHandle {
    fn query(&self, package: &str) -> QueryOutcome {
        self.0.queried.lock().unwrap().push(package.to_string());
        self.0
            .responses
            .get(package)
            .cloned()
            .unwrap_or(QueryOutcome::Unknown)
    }
}

/// Create an install prefix containing the given library filenames under
/// `lib/`. Returns the TempDir; keep it alive to prevent cleanup.
pub fn prefix_with_libs(lib_files: &[&str]) -> TempDir {
    let prefix = tempfile::tempdir().unwrap();
    let lib_dir = prefix.path().join("lib");
    fs::create_dir(&lib_dir).unwrap();
    for name in lib_files {
        File::create(lib_dir.join(name)).unwrap();
    }
    prefix
}

/// Add a header file under `<prefix>/include`
pub fn add_header(prefix: &Path, name: &str) {
    let include_dir = prefix.join("include");
    fs::create_dir_all(&include_dir).unwrap();
    File::create(include_dir.join(name)).unwrap();
}
