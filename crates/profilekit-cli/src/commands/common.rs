//! Common types and utilities for command execution

use std::path::{Path, PathBuf};

use anyhow::Context;
use profilekit_core::{ProfileCompiler, ProfileRegistry, SourceDiscovery};
use tracing::debug;

/// Where commands read their profiles from
pub struct LoadOptions<'a> {
    /// Explicit profiles file
    pub source: Option<&'a Path>,
    /// Cache file for the consolidated profiles
    pub cache: Option<&'a Path>,
}

impl<'a> LoadOptions<'a> {
    /// Create new load options
    #[must_use]
    pub const fn new(source: Option<&'a Path>, cache: Option<&'a Path>) -> Self {
        Self { source, cache }
    }

    /// Locate the profiles file
    ///
    /// # Errors
    ///
    /// Returns an error if no profiles file can be found.
    pub fn source_path(&self) -> anyhow::Result<PathBuf> {
        SourceDiscovery::discover(self.source).context(
            "No profiles file found (use --source or create profiles.toml in this directory)",
        )
    }

    /// Locate, compile and load the profiles file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be found, read or parsed.
    pub fn load_registry(&self) -> anyhow::Result<(PathBuf, ProfileRegistry)> {
        let source = self.source_path()?;
        debug!(source = %source.display(), "Loading profiles");

        let registry = ProfileCompiler::default()
            .read_from_file(&source, self.cache)
            .with_context(|| format!("Failed to load profiles from {}", source.display()))?;

        Ok((source, registry))
    }
}
