//! Default accumulating plugin with pluggable normalization

use std::collections::BTreeMap;
use std::mem;

use tracing::debug;

use super::{ProfileInstancePlugin, ProfilePlugin};
use crate::profile::{CategoryProfiles, Profile, ProfileStore};

/// Category-specific behavior plugged into a [`CategoryPlugin`]
pub trait CategoryHooks {
    /// Normalize a profile after common parameters were merged in
    ///
    /// The result is tagged with its resolved name afterwards.
    fn normalize(&self, _category: &str, _name: &str, profile: Profile) -> Profile {
        profile
    }

    /// Connector construction capability of the category
    fn instance_plugin(&self) -> Option<&dyn ProfileInstancePlugin> {
        None
    }
}

/// Hooks that leave profiles untouched and build no connectors
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl CategoryHooks for PassThrough {}

/// Plugin merging common parameters into every profile and expanding aliases
#[derive(Debug, Clone, Default)]
pub struct CategoryPlugin<H = PassThrough> {
    category: String,
    hooks: H,
    aliases: BTreeMap<String, String>,
    common: Profile,
    pending: BTreeMap<String, Profile>,
    seeded: BTreeMap<String, Profile>,
}

impl CategoryPlugin {
    /// Create a pass-through plugin for `category`
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self::with_hooks(category, PassThrough)
    }
}

impl<H: CategoryHooks> CategoryPlugin<H> {
    /// Create a plugin for `category` driven by `hooks`
    #[must_use]
    pub fn with_hooks(category: impl Into<String>, hooks: H) -> Self {
        Self {
            category: category.into(),
            hooks,
            aliases: BTreeMap::new(),
            common: Profile::new(),
            pending: BTreeMap::new(),
            seeded: BTreeMap::new(),
        }
    }

    /// Category handled by this plugin
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Borrow the hooks
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }
}

impl<H: CategoryHooks> ProfilePlugin for CategoryPlugin<H> {
    fn set_aliases(&mut self, aliases: BTreeMap<String, String>) {
        self.aliases = aliases;
    }

    fn set_common(&mut self, common: Profile) {
        self.common = common;
    }

    fn add_profile(&mut self, name: &str, params: Profile) {
        self.seeded.remove(name);
        self.pending.insert(name.to_string(), params);
    }

    fn add_profiles(&mut self, profiles: BTreeMap<String, Profile>) {
        for (name, profile) in profiles {
            self.pending.remove(&name);
            self.seeded.insert(name, profile);
        }
    }

    fn get_profiles(&mut self, out: &mut ProfileStore) {
        let mut aliases = mem::take(&mut self.aliases);
        let common = mem::take(&mut self.common);
        let pending = mem::take(&mut self.pending);
        let mut profiles = mem::take(&mut self.seeded);

        for (name, raw) in pending {
            let mut profile = self
                .hooks
                .normalize(&self.category, &name, raw.merged_over(&common));
            profile.tag_name(&name);
            profiles.insert(name, profile);
        }

        // A profile defined under its own name shadows an alias of that name.
        aliases.retain(|alias, _| {
            profiles
                .get(alias)
                .is_none_or(|profile| profile.name() != Some(alias.as_str()))
        });

        let mut record = CategoryProfiles {
            aliases,
            common,
            profiles,
        };
        record.expand_aliases(&self.category);

        debug!(
            category = %self.category,
            profiles = record.profiles.len(),
            aliases = record.aliases.len(),
            "Consolidated category"
        );

        out.replace_category(self.category.clone(), record);
    }

    fn as_instance_plugin(&self) -> Option<&dyn ProfileInstancePlugin> {
        self.hooks.instance_plugin()
    }
}
