//! Profiles file discovery from multiple locations

use std::path::{Path, PathBuf};

/// File name looked up in the working directory and its parents
pub const SOURCE_FILE_NAME: &str = "profiles.toml";

/// Profiles file discovery
///
/// Precedence (highest first):
/// 1. an explicitly given path
/// 2. `profiles.toml` in the start directory or one of its parents
/// 3. `profilekit/profiles.toml` in the XDG config directory
pub struct SourceDiscovery;

impl SourceDiscovery {
    /// Discover the profiles file, starting from the current directory
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        let start = std::env::current_dir().ok();
        Self::discover_from(start.as_deref(), explicit)
    }

    /// Discover the profiles file, starting from `start`
    ///
    /// An explicit path is returned even if it does not exist, so that the
    /// caller reports the missing file instead of silently using another one.
    pub fn discover_from(start: Option<&Path>, explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }

        start
            .and_then(|dir| Self::find_file(dir, SOURCE_FILE_NAME))
            .or_else(Self::find_global_source)
    }

    /// Find a file in `start` or its parent directories
    fn find_file(start: &Path, name: &str) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Find the profiles file in the XDG config directory
    fn find_global_source() -> Option<PathBuf> {
        let global = dirs::config_dir()?
            .join("profilekit")
            .join(SOURCE_FILE_NAME);

        global.is_file().then_some(global)
    }
}
