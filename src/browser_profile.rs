//! Per-session Chrome profile directories
//!
//! Every browser session launches with its own UUID-named user-data
//! directory so concurrent searches never contend for Chrome's
//! `SingletonLock`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Prefix shared by all profile directories created by this crate
pub const PROFILE_PREFIX: &str = "headless_search_chrome";

/// RAII wrapper for a Chrome profile directory
///
/// Removes the directory on drop unless `into_path()` transferred ownership.
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    cleanup_on_drop: bool,
}

impl BrowserProfile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            cleanup_on_drop: true,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the profile and return the path, disabling auto-cleanup
    ///
    /// The new owner (the session's browser wrapper) removes the directory
    /// after the browser process has exited.
    #[must_use]
    pub fn into_path(mut self) -> PathBuf {
        self.cleanup_on_drop = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.cleanup_on_drop && self.path.exists() {
            info!("BrowserProfile cleanup: removing {}", self.path.display());
            if let Err(e) = std::fs::remove_dir_all(&self.path) {
                warn!(
                    "Failed to cleanup profile directory {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Create a unique profile directory under the system temp dir
///
/// `create_dir` (not `create_dir_all`) fails on an existing path, so a UUID
/// collision surfaces as an error instead of two browsers sharing a profile.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn create_unique_profile() -> Result<BrowserProfile> {
    create_profile_in(&std::env::temp_dir())
}

/// Create a unique profile directory inside `parent`
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn create_profile_in(parent: &Path) -> Result<BrowserProfile> {
    let path = parent.join(format!("{PROFILE_PREFIX}_{}", Uuid::new_v4()));

    debug!("Creating Chrome profile: {}", path.display());

    std::fs::create_dir(&path)
        .with_context(|| format!("Failed to create profile directory: {}", path.display()))?;

    Ok(BrowserProfile::new(path))
}
