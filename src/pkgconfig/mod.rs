// src/pkgconfig/mod.rs

//! Package-config query adapter
//!
//! Wraps the external `pkg-config` executable behind the [`PackageQuery`]
//! trait so the resolver can be exercised against a mock. Failures of the
//! mechanism itself (missing binary, spawn error, timeout) are an internal
//! control value ([`QueryOutcome::Unavailable`]) that the resolver recovers
//! from by probing install prefixes directly; they are never fatal.
//!
//! Token classification follows the pkg-config output convention:
//! `-I<dir>` is an include path, `-L<dir>` a library path, `-l<name>` a link
//! name; anything else from `--cflags` is an extra compiler flag and
//! anything else from `--libs` an extra linker flag.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

/// Default timeout for a single pkg-config invocation (10 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Compile/link metadata reported by the query mechanism for one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PkgConfigData {
    pub version: Option<String>,
    pub include_dirs: Vec<PathBuf>,
    pub library_dirs: Vec<PathBuf>,
    pub link_names: Vec<String>,
    pub extra_cflags: Vec<String>,
    pub extra_ldflags: Vec<String>,
}

/// Outcome of asking the query mechanism about one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The mechanism knows the package
    Found(PkgConfigData),
    /// The mechanism ran cleanly but does not know the package
    Unknown,
    /// The mechanism itself could not be used
    Unavailable,
}

/// Query mechanism seam; the production implementation shells out to
/// pkg-config, tests inject a mock
pub trait PackageQuery {
    fn query(&self, package: &str) -> QueryOutcome;
}

/// The external pkg-config tool, invoked once per flag class per package
pub struct PkgConfigTool {
    program: PathBuf,
    timeout: Duration,
}

impl Default for PkgConfigTool {
    fn default() -> Self {
        Self::new("pkg-config")
    }
}

enum RunResult {
    /// Success exit; trimmed stdout
    Output(String),
    /// Clean non-zero exit: the package is unknown to this mechanism
    NonZero,
    /// Spawn failure, timeout, or unreadable output
    Unavailable,
}

impl PkgConfigTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set a custom per-invocation timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Whether the query mechanism responds at all
    pub fn is_available(&self) -> bool {
        matches!(self.run(&["--version"]), RunResult::Output(_))
    }

    fn run(&self, args: &[&str]) -> RunResult {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null()) // prevent stdin hangs
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();

        let mut child = match child {
            Ok(child) => child,
            Err(e) => {
                debug!("failed to spawn {}: {}", self.program.display(), e);
                return RunResult::Unavailable;
            }
        };

        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => {
                let output = match child.wait_with_output() {
                    Ok(output) => output,
                    Err(e) => {
                        warn!("failed to read {} output: {}", self.program.display(), e);
                        return RunResult::Unavailable;
                    }
                };
                if status.success() {
                    RunResult::Output(String::from_utf8_lossy(&output.stdout).trim().to_string())
                } else {
                    debug!(
                        "{} {:?} exited with {}: {}",
                        self.program.display(),
                        args,
                        status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                    RunResult::NonZero
                }
            }
            Ok(None) => {
                let _ = child.kill();
                warn!(
                    "{} timed out after {} seconds",
                    self.program.display(),
                    self.timeout.as_secs()
                );
                RunResult::Unavailable
            }
            Err(e) => {
                let _ = child.kill();
                warn!("failed to wait for {}: {}", self.program.display(), e);
                RunResult::Unavailable
            }
        }
    }
}

impl PackageQuery for PkgConfigTool {
    fn query(&self, package: &str) -> QueryOutcome {
        debug!("querying {} for {}", self.program.display(), package);

        let cflags = match self.run(&["--cflags", package]) {
            RunResult::Output(text) => text,
            RunResult::NonZero => return QueryOutcome::Unknown,
            RunResult::Unavailable => return QueryOutcome::Unavailable,
        };
        let libs = match self.run(&["--libs", package]) {
            RunResult::Output(text) => text,
            RunResult::NonZero => return QueryOutcome::Unknown,
            RunResult::Unavailable => return QueryOutcome::Unavailable,
        };
        // Version is best-effort; a package without one still resolves
        let version = match self.run(&["--modversion", package]) {
            RunResult::Output(text) if !text.is_empty() => Some(text),
            _ => None,
        };

        let mut data = PkgConfigData {
            version,
            ..Default::default()
        };
        classify_cflags(&cflags, &mut data);
        classify_libs(&libs, &mut data);

        QueryOutcome::Found(data)
    }
}

fn classify_cflags(text: &str, data: &mut PkgConfigData) {
    for token in text.split_whitespace() {
        match token.strip_prefix("-I") {
            Some(dir) if !dir.is_empty() => data.include_dirs.push(PathBuf::from(dir)),
            _ => data.extra_cflags.push(token.to_string()),
        }
    }
}

fn classify_libs(text: &str, data: &mut PkgConfigData) {
    for token in text.split_whitespace() {
        if let Some(dir) = token.strip_prefix("-L") {
            if !dir.is_empty() {
                data.library_dirs.push(PathBuf::from(dir));
                continue;
            }
        }
        if let Some(name) = token.strip_prefix("-l") {
            if !name.is_empty() {
                data.link_names.push(name.to_string());
                continue;
            }
        }
        data.extra_ldflags.push(token.to_string());
    }
}
