// src/loader.rs

//! Runtime shared-library loading with a process-wide handle cache
//!
//! In-process code belonging to one installed package sometimes needs a
//! compiled component of another. The cache locates the library file under
//! the known search prefixes, opens it with `dlopen`, and keeps the handle
//! for the remainder of the process. The cache is an explicit value the
//! embedding process constructs and owns; there is no module-level
//! singleton. One lock spans the check-else-load-and-insert sequence so
//! concurrent first use of the same library cannot open it twice.

use crate::error::{Error, Result};
use crate::probe;
use crate::resolver::SearchPrefixes;
use std::collections::HashMap;
use std::ffi::{CStr, CString, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// A shared library opened at runtime; stays loaded until process exit
#[derive(Debug)]
pub struct LibraryHandle {
    package: String,
    logical_name: String,
    path: PathBuf,
    raw: *mut c_void,
}

// dlopen handles are process-global and reference-counted by the runtime
// linker; sharing the pointer across threads is sound.
unsafe impl Send for LibraryHandle {}
unsafe impl Sync for LibraryHandle {}

impl LibraryHandle {
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The raw dlopen handle, for callers that need to look up symbols
    pub fn as_raw(&self) -> *mut c_void {
        self.raw
    }

    fn open(package: &str, logical_name: &str, path: PathBuf) -> Result<Self> {
        let c_path =
            CString::new(path.as_os_str().as_bytes()).map_err(|_| Error::LibraryLoad {
                path: path.clone(),
                reason: "path contains a NUL byte".to_string(),
            })?;

        // RTLD_GLOBAL so interdependent components can see each other's
        // symbols once any of them is loaded
        let raw = unsafe { libc::dlopen(c_path.as_ptr(), libc::RTLD_NOW | libc::RTLD_GLOBAL) };
        if raw.is_null() {
            let reason = unsafe {
                let message = libc::dlerror();
                if message.is_null() {
                    "unknown dlopen failure".to_string()
                } else {
                    CStr::from_ptr(message).to_string_lossy().into_owned()
                }
            };
            return Err(Error::LibraryLoad { path, reason });
        }

        Ok(Self {
            package: package.to_string(),
            logical_name: logical_name.to_string(),
            path,
            raw,
        })
    }
}

/// Process-wide cache of loaded library handles, keyed by
/// (package name, logical library name)
#[derive(Debug)]
pub struct LibraryCache {
    prefixes: SearchPrefixes,
    loaded: Mutex<HashMap<(String, String), Arc<LibraryHandle>>>,
}

impl LibraryCache {
    pub fn new(prefixes: SearchPrefixes) -> Self {
        Self {
            prefixes,
            loaded: Mutex::new(HashMap::new()),
        }
    }

    /// Locate and load a compiled component, reusing an already-loaded
    /// handle when one exists
    pub fn resolve_library(&self, package: &str, logical_name: &str) -> Result<Arc<LibraryHandle>> {
        let key = (package.to_string(), logical_name.to_string());

        let mut loaded = self.loaded.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = loaded.get(&key) {
            debug!("library cache hit for {}:{}", package, logical_name);
            return Ok(Arc::clone(handle));
        }

        let location = probe::find_library(logical_name, &self.prefixes.library_dirs())
            .ok_or_else(|| Error::LibraryNotFound {
                package: package.to_string(),
                logical_name: logical_name.to_string(),
            })?;

        debug!(
            "loading {} for {} from {}",
            logical_name,
            package,
            location.path.display()
        );
        let handle = Arc::new(LibraryHandle::open(package, logical_name, location.path)?);
        loaded.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    /// Number of handles currently loaded
    pub fn len(&self) -> usize {
        self.loaded.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
