//! Error types for profile resolution, compilation and pooling

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`ProfileError`]
pub type Result<T> = std::result::Result<T, ProfileError>;

/// Boxed error returned by connector factory callbacks
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the profile registry, compiler and cache
#[derive(Error, Debug)]
pub enum ProfileError {
    /// An argument was rejected before any lookup happened
    #[error("{message}")]
    InvalidArgument {
        /// Description of the rejected argument
        message: String,
    },

    /// No profile matches the requested name and no default can stand in
    #[error("{}", not_found_message(.category, .name))]
    ProfileNotFound {
        /// Category that was searched
        category: String,
        /// Requested profile name (`default` when none was given)
        name: String,
    },

    /// A virtual alias refers to a profile that does not exist
    #[error("Unknown profile \"{target}\" for \"{category}\"")]
    AliasTargetNotFound {
        /// Category of the alias
        category: String,
        /// Missing target profile
        target: String,
    },

    /// A connector factory callback failed
    #[error("Failed to build connector for profile \"{name}\" of \"{category}\": {source}")]
    ConnectorFactory {
        /// Category of the profile
        category: String,
        /// Resolved profile name
        name: String,
        /// Error returned by the factory
        #[source]
        source: FactoryError,
    },

    /// A source or cache file could not be read or written
    #[error("Failed to access {}: {source}", .path.display())]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The declarative source is not valid TOML
    #[error("Failed to parse profiles source {}: {source}", .path.display())]
    Parse {
        /// Source file (empty when parsing from memory)
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// The profiles cache could not be encoded or decoded
    #[error("Invalid profiles cache {}: {source}", .path.display())]
    Cache {
        /// Cache file
        path: PathBuf,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },
}

impl ProfileError {
    pub(crate) fn not_found(category: &str, name: &str) -> Self {
        Self::ProfileNotFound {
            category: category.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports a missing profile or alias target
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ProfileNotFound { .. } | Self::AliasTargetNotFound { .. }
        )
    }
}

fn not_found_message(category: &str, name: &str) -> String {
    if name == "default" {
        format!("No default profile for \"{category}\"")
    } else {
        format!("Unknown profile \"{name}\" for \"{category}\"")
    }
}
