//! # profilekit-core
//!
//! Named connection profiles with default fallback, category plugins and a
//! connector pool.
//!
//! A profiles source groups sections by category. The [`ProfileCompiler`]
//! feeds them to one plugin per category, which normalizes every profile and
//! expands aliases. The resulting [`ProfileRegistry`] resolves names, creates
//! profiles at runtime, and caches the connectors built from them.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Compilation of raw sources and the on-disk profiles cache
pub mod compiler;

/// Error types
pub mod error;

/// Category plugin protocol and plugin lookup
pub mod plugin;

/// Profiles, parameter values and consolidated categories
pub mod profile;

/// Name resolution and the connector pool
pub mod registry;

/// Declarative profiles sources and their discovery
pub mod source;

pub use compiler::{ProfileCache, ProfileCompiler};
pub use error::{ProfileError, Result};
pub use plugin::{
    CategoryHooks, CategoryPlugin, PluginResolver, PluginSet, ProfileInstancePlugin,
    ProfilePlugin,
};
pub use profile::{CategoryProfiles, Profile, ProfileStore, Value};
pub use registry::{Connector, ProfileRegistry, VirtualProfile};
pub use source::{RawEntry, RawSource, SourceDiscovery};
