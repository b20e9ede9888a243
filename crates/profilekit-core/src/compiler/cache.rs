//! On-disk cache of consolidated profiles, invalidated by modification time

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::error::{ProfileError, Result};
use crate::profile::ProfileStore;

/// JSON snapshot of a [`ProfileStore`] next to its source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCache {
    path: PathBuf,
}

impl ProfileCache {
    /// Create a cache stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the cache exists and is at least as recent as `source`
    ///
    /// # Errors
    ///
    /// Returns an error if the source metadata cannot be read.
    pub fn is_fresh(&self, source: &Path) -> Result<bool> {
        if !self.path.is_file() {
            return Ok(false);
        }

        let source_time = modified_time(source)?;
        let cache_time = modified_time(&self.path)?;

        Ok(cache_time >= source_time)
    }

    /// Load the cached profiles if the cache is fresh and readable
    ///
    /// A stale, unreadable or undecodable cache yields `None`.
    pub fn load_if_fresh(&self, source: &Path) -> Option<ProfileStore> {
        match self.is_fresh(source) {
            Ok(true) => {}
            Ok(false) => {
                debug!(cache = %self.path.display(), "Profiles cache is missing or stale");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Cannot compare profiles cache with its source");
                return None;
            }
        }

        match self.load() {
            Ok(store) => {
                info!(cache = %self.path.display(), "Loaded profiles from cache");
                Some(store)
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unusable profiles cache");
                None
            }
        }
    }

    /// Load the cached profiles regardless of freshness
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn load(&self) -> Result<ProfileStore> {
        let text =
            fs::read_to_string(&self.path).map_err(|source| ProfileError::io(&self.path, source))?;

        serde_json::from_str(&text).map_err(|source| ProfileError::Cache {
            path: self.path.clone(),
            source,
        })
    }

    /// Write the profiles to the cache file, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns an error if the profiles cannot be serialized or written.
    pub fn write(&self, store: &ProfileStore) -> Result<()> {
        let json = serde_json::to_string_pretty(store).map_err(|source| ProfileError::Cache {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ProfileError::io(parent, source))?;
        }

        fs::write(&self.path, json).map_err(|source| ProfileError::io(&self.path, source))?;
        info!(cache = %self.path.display(), "Wrote profiles cache");
        Ok(())
    }
}

/// Modification time of a file
fn modified_time(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| ProfileError::io(path, source))
}
