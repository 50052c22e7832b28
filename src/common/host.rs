//! Read-only view of the machine the installer runs on.
//!
//! Detection and the strategies only ask questions through [`Host`], so the
//! whole classification pipeline can be exercised against an in-memory host.

use std::path::{Path, PathBuf};

use sudo::RunningAs;

/// Queries about the live host. None of these may fail: missing signals are
/// reported as `None`/`false` and callers fall back to "unknown".
pub trait Host {
    /// Contents of a text file, or `None` if it is missing or unreadable.
    fn read_file(&self, path: &Path) -> Option<String>;

    fn file_exists(&self, path: &Path) -> bool;

    /// Whether `program` resolves on `PATH`.
    fn has_program(&self, program: &str) -> bool;

    fn env_var(&self, key: &str) -> Option<String>;

    /// Kernel machine type, as reported by `uname -m`.
    fn machine(&self) -> Option<String>;

    fn is_root(&self) -> bool;

    fn home_dir(&self) -> Option<PathBuf>;

    /// Paths matching a glob pattern (used for wildcard cleanup targets).
    fn glob(&self, pattern: &str) -> Vec<PathBuf>;
}

/// Effective uid 0, whatever the real uid is (setuid binaries included).
fn is_superuser(running: RunningAs) -> bool {
    matches!(running, RunningAs::Root | RunningAs::Suid)
}

/// The real machine.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveHost;

impl Host for LiveHost {
    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn has_program(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn env_var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn machine(&self) -> Option<String> {
        nix::sys::utsname::uname()
            .ok()
            .map(|uts| uts.machine().to_string_lossy().into_owned())
    }

    fn is_root(&self) -> bool {
        is_superuser(sudo::check())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        glob::glob(pattern)
            .map(|paths| paths.flatten().collect())
            .unwrap_or_default()
    }
}
