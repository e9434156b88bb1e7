//! Detect whether the calling process runs inside a sandbox.
//!
//! ```rust,no_run
//! use gamemode_client::sandbox::{FlatpakInfo, SandboxDetector};
//!
//! if FlatpakInfo::default().is_sandboxed() {
//!     println!("Talking to the GameMode portal");
//! }
//! ```

use std::path::{Path, PathBuf};

/// The marker file Flatpak mounts into every sandbox.
pub const FLATPAK_INFO: &str = "/.flatpak-info";

/// A strategy deciding whether the process is sandboxed.
///
/// The check is run again for every request, so implementations should be
/// cheap and side-effect free.
pub trait SandboxDetector {
    /// Whether requests should go through the portal.
    fn is_sandboxed(&self) -> bool;
}

/// Detects a Flatpak sandbox through its info file.
///
/// The process is considered sandboxed if the file exists and is not empty.
/// Any failure to stat the file, including a permission error, means "not
/// sandboxed".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatpakInfo {
    path: PathBuf,
}

impl FlatpakInfo {
    /// Probe `path` instead of [`FLATPAK_INFO`].
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The marker file being probed.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FlatpakInfo {
    fn default() -> Self {
        Self::with_path(FLATPAK_INFO)
    }
}

impl SandboxDetector for FlatpakInfo {
    fn is_sandboxed(&self) -> bool {
        // lstat, a symlink pointing at a real file does not count.
        match std::fs::symlink_metadata(&self.path) {
            Ok(metadata) => metadata.len() > 0,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Failed to stat {}: {_e}", self.path.display());
                false
            }
        }
    }
}

impl<F> SandboxDetector for F
where
    F: Fn() -> bool,
{
    fn is_sandboxed(&self) -> bool {
        self()
    }
}
