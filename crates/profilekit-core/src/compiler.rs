//! Compilation of raw sources into consolidated profiles
//!
//! The compiler routes every section of a [`RawSource`] to the plugin of its
//! category, then collects the consolidated categories into a
//! [`ProfileStore`]. Alias and common sections always reach a plugin before
//! the profile sections of the same category.

mod cache;


use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

pub use cache::ProfileCache;

use crate::error::Result;
use crate::plugin::{PluginResolver, PluginSet};
use crate::profile::{COMMON_SECTION, Profile, ProfileStore};
use crate::registry::ProfileRegistry;
use crate::source::{RawEntry, RawSource, SECTION_SEPARATOR};

/// Drives category plugins over raw sources
pub struct ProfileCompiler {
    plugins: Box<dyn PluginResolver>,
}

impl ProfileCompiler {
    /// Create a compiler resolving plugins through `plugins`
    pub fn new<R>(plugins: R) -> Self
    where
        R: PluginResolver + 'static,
    {
        Self {
            plugins: Box::new(plugins),
        }
    }

    /// Consolidate a raw source
    ///
    /// Section keys split on the first separator, so `db:eu:west` defines
    /// profile `eu:west` of category `db`. Scalar entries and sections with
    /// an empty category or profile name are skipped.
    pub fn compile(&mut self, source: &RawSource) -> ProfileStore {
        let mut touched: Vec<&str> = Vec::new();
        let mut profile_sections: Vec<(&str, &str, &Profile)> = Vec::new();

        // First pass: alias and common sections.
        for (key, entry) in source {
            let RawEntry::Section(params) = entry else {
                debug!(section = %key, "Skipping scalar entry");
                continue;
            };

            match key.split_once(SECTION_SEPARATOR) {
                None if key.is_empty() => {
                    warn!("Skipping section with an empty category");
                }
                None => {
                    self.plugins.resolve(key).set_aliases(alias_table(key, params));
                    touch(&mut touched, key);
                }
                Some((category, name)) if category.is_empty() || name.is_empty() => {
                    warn!(section = %key, "Skipping section with an empty category or profile name");
                }
                Some((category, COMMON_SECTION)) => {
                    self.plugins.resolve(category).set_common(params.clone());
                    touch(&mut touched, category);
                }
                Some((category, name)) => profile_sections.push((category, name, params)),
            }
        }

        // Second pass: individual profiles.
        for (category, name, params) in profile_sections {
            self.plugins.resolve(category).add_profile(name, params.clone());
            touch(&mut touched, category);
        }

        let mut store = ProfileStore::new();
        for category in touched {
            self.plugins.resolve(category).get_profiles(&mut store);
        }

        debug!(categories = store.len(), "Compiled profiles source");
        store
    }

    /// Compile an in-memory source into a registry
    pub fn read_from_source(mut self, source: &RawSource) -> ProfileRegistry {
        let store = self.compile(source);
        self.into_registry(store)
    }

    /// Load a profiles file into a registry, going through `cache` when given
    ///
    /// A cache at least as recent as the source is loaded as is. Otherwise
    /// the source is compiled and the cache rewritten. Failing to write the
    /// cache is logged and does not fail the load.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or parsed.
    pub fn read_from_file(mut self, source: &Path, cache: Option<&Path>) -> Result<ProfileRegistry> {
        let cache = cache.map(ProfileCache::new);

        if let Some(store) = cache.as_ref().and_then(|cache| cache.load_if_fresh(source)) {
            return Ok(self.into_registry(store));
        }

        let raw = RawSource::from_file(source)?;
        let store = self.compile(&raw);
        info!(source = %source.display(), categories = store.len(), "Loaded profiles");

        if let Some(cache) = &cache
            && let Err(e) = cache.write(&store)
        {
            warn!(error = %e, "Could not write profiles cache");
        }

        Ok(self.into_registry(store))
    }

    /// Hand consolidated profiles and the plugins over to a registry
    pub fn into_registry(self, store: ProfileStore) -> ProfileRegistry {
        ProfileRegistry::with_resolver(store, self.plugins)
    }
}

impl Default for ProfileCompiler {
    fn default() -> Self {
        Self::new(PluginSet::new())
    }
}

impl fmt::Debug for ProfileCompiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileCompiler").finish_non_exhaustive()
    }
}

fn touch<'a>(touched: &mut Vec<&'a str>, category: &'a str) {
    if !touched.contains(&category) {
        touched.push(category);
    }
}

/// Alias table of a category section; only text values name a target
fn alias_table(category: &str, params: &Profile) -> BTreeMap<String, String> {
    params
        .iter()
        .filter_map(|(alias, target)| match target.as_str() {
            Some(target) => Some((alias.clone(), target.to_string())),
            None => {
                warn!(category, alias = %alias, "Skipping alias whose target is not a profile name");
                None
            }
        })
        .collect()
}
