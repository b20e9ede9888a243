//! Profile registry and connector pool
//!
//! The registry answers "which parameters does profile `name` of `category`
//! use", applying the default fallback, and owns the connectors built from
//! those profiles. Connectors are pooled under the resolved profile name, so
//! an alias and its target share one connector.

mod pool;


use std::fmt;

use tracing::{debug, info};

pub use pool::{Connector, ConnectorPool};

use crate::error::{FactoryError, ProfileError, Result};
use crate::plugin::{PluginResolver, PluginSet};
use crate::profile::{DEFAULT_PROFILE, Profile, ProfileStore};

/// Definition of a profile created at runtime
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualProfile {
    /// Copy an existing profile of the same category under a new name
    Alias(String),
    /// Define a new profile from raw parameters
    Params(Profile),
}

impl From<&str> for VirtualProfile {
    fn from(target: &str) -> Self {
        Self::Alias(target.to_string())
    }
}

impl From<String> for VirtualProfile {
    fn from(target: String) -> Self {
        Self::Alias(target)
    }
}

impl From<Profile> for VirtualProfile {
    fn from(params: Profile) -> Self {
        Self::Params(params)
    }
}

/// Resolved profiles plus the connectors built from them
pub struct ProfileRegistry {
    store: ProfileStore,
    pool: ConnectorPool,
    plugins: Box<dyn PluginResolver>,
}

impl ProfileRegistry {
    /// Create a registry over consolidated profiles
    pub fn new<R>(store: ProfileStore, plugins: R) -> Self
    where
        R: PluginResolver + 'static,
    {
        Self::with_resolver(store, Box::new(plugins))
    }

    /// Create a registry using pass-through plugins for every category
    #[must_use]
    pub fn from_store(store: ProfileStore) -> Self {
        Self::new(store, PluginSet::new())
    }

    pub(crate) fn with_resolver(store: ProfileStore, plugins: Box<dyn PluginResolver>) -> Self {
        Self {
            store,
            pool: ConnectorPool::new(),
            plugins,
        }
    }

    /// Consolidated profiles currently known
    pub const fn store(&self) -> &ProfileStore {
        &self.store
    }

    /// Known category names in order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.store.categories()
    }

    /// Whether the category has been loaded or created
    pub fn has_category(&self, category: &str) -> bool {
        self.store.category(category).is_some()
    }

    /// Get the parameters of a profile
    ///
    /// An empty `name` means `default`. Unknown names fall back to the
    /// `default` profile of the category unless `require_exact` is set.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] when neither the name nor a
    /// usable default exists.
    pub fn get(&self, category: &str, name: &str, require_exact: bool) -> Result<&Profile> {
        resolve(&self.store, category, name, require_exact)
    }

    /// Get the default profile of a category
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] if the category has no default.
    pub fn get_default(&self, category: &str) -> Result<&Profile> {
        self.get(category, DEFAULT_PROFILE, true)
    }

    /// Define or redefine a profile at runtime
    ///
    /// An alias definition copies the target's normalized profile, keeping
    /// the target's resolved name. A parameter definition goes through the
    /// category plugin together with the category's existing profiles.
    /// A connector pooled under `(category, name)` is released first.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::InvalidArgument`] for an empty name and
    /// [`ProfileError::AliasTargetNotFound`] for an unknown alias target.
    pub fn create_virtual_profile(
        &mut self,
        category: &str,
        name: &str,
        definition: impl Into<VirtualProfile>,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(ProfileError::InvalidArgument {
                message: format!("The name of a virtual profile for \"{category}\" is empty"),
            });
        }

        match definition.into() {
            VirtualProfile::Alias(target) => self.create_alias(category, name, target),
            VirtualProfile::Params(params) => {
                self.evict(category, name);
                self.create_from_params(category, name, params);
                Ok(())
            }
        }
    }

    fn create_alias(&mut self, category: &str, name: &str, target: String) -> Result<()> {
        let Some(copy) = self.store.get(category, &target).cloned() else {
            return Err(ProfileError::AliasTargetNotFound {
                category: category.to_string(),
                target,
            });
        };

        self.evict(category, name);

        if let Some(record) = self.store.category_mut(category) {
            record.profiles.insert(name.to_string(), copy);
            if name != target {
                record.aliases.insert(name.to_string(), target);
            }
            // Aliases chaining through `name` must follow its new definition.
            record.expand_aliases(category);
        }

        debug!(category, name, "Created virtual alias");
        Ok(())
    }

    fn create_from_params(&mut self, category: &str, name: &str, params: Profile) {
        let plugin = self.plugins.resolve(category);

        if let Some(record) = self.store.category(category) {
            let mut aliases = record.aliases.clone();
            aliases.remove(name);
            plugin.set_aliases(aliases);
            plugin.set_common(record.common.clone());
            plugin.add_profiles(
                record
                    .own_profiles()
                    .filter(|(existing, _)| existing.as_str() != name)
                    .map(|(existing, profile)| (existing.clone(), profile.clone()))
                    .collect(),
            );
        }

        plugin.add_profile(name, params);
        plugin.get_profiles(&mut self.store);

        debug!(category, name, "Created virtual profile");
    }

    /// Release every pooled connector and forget every profile
    ///
    /// Plugins with teardown support close each connector of their category
    /// before it is dropped. Lookups fail until profiles are created again.
    pub fn clear(&mut self) {
        let entries = self.pool.drain();
        let released = entries.len();

        for (category, name, connector) in entries {
            if let Some(connector) = connector {
                teardown(self.plugins.as_mut(), &category, &name, &connector);
            }
        }

        self.store.clear();
        info!(connectors = released, "Cleared profiles and connector pool");
    }

    /// Put a connector in the pool, replacing any previous entry
    ///
    /// `name` must be a resolved profile name, not an alias.
    pub fn store_connector(&mut self, category: &str, name: &str, connector: Connector) {
        self.pool.store(category, name, Some(connector));
    }

    /// Pooled connector for a resolved profile name, without building one
    pub fn get_connector(&self, category: &str, name: &str) -> Option<Connector> {
        self.pool.get(category, name)
    }

    /// Whether a construction result is cached for the resolved name
    pub fn is_pooled(&self, category: &str, name: &str) -> bool {
        self.pool.is_populated(category, name)
    }

    /// Release and evict the connector pooled for a resolved profile name
    ///
    /// Returns whether an entry was evicted.
    pub fn remove_connector(&mut self, category: &str, name: &str) -> bool {
        self.evict(category, name)
    }

    /// Pooled connector for a profile, building it with `factory` on first use
    ///
    /// Whatever the factory returns is cached, `None` included, so it runs
    /// at most once per resolved name until the entry is evicted.
    ///
    /// # Errors
    ///
    /// Returns profile lookup errors, and [`ProfileError::ConnectorFactory`]
    /// if the factory fails. A failed factory leaves the pool untouched.
    pub fn get_connector_or_create<F, E>(
        &mut self,
        category: &str,
        name: &str,
        require_exact: bool,
        factory: F,
    ) -> Result<Option<Connector>>
    where
        F: FnOnce(&Profile) -> std::result::Result<Option<Connector>, E>,
        E: Into<FactoryError>,
    {
        let profile = resolve(&self.store, category, name, require_exact)?;
        let key = pool_key(profile, name);

        if self.pool.is_populated(category, key) {
            return Ok(self.pool.get(category, key));
        }

        let connector = factory(profile).map_err(|source| ProfileError::ConnectorFactory {
            category: category.to_string(),
            name: key.to_string(),
            source: source.into(),
        })?;

        debug!(category, name = key, built = connector.is_some(), "Pooled connector from factory");
        self.pool.store(category, key, connector.clone());
        Ok(connector)
    }

    /// Pooled connector for a profile, built by the category plugin on first use
    ///
    /// A plugin without connector support yields `None`, which is cached
    /// like any other result.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::ProfileNotFound`] when the profile cannot be resolved.
    pub fn get_connector_via_plugin(
        &mut self,
        category: &str,
        name: &str,
        require_exact: bool,
    ) -> Result<Option<Connector>> {
        let profile = resolve(&self.store, category, name, require_exact)?;
        let key = pool_key(profile, name);

        if self.pool.is_populated(category, key) {
            return Ok(self.pool.get(category, key));
        }

        let connector = match self.plugins.resolve(category).as_instance_plugin() {
            Some(instances) => instances.get_instance_for_pool(key, profile),
            None => {
                debug!(category, "Plugin has no connector support");
                None
            }
        };

        debug!(category, name = key, built = connector.is_some(), "Pooled connector from plugin");
        self.pool.store(category, key, connector.clone());
        Ok(connector)
    }

    fn evict(&mut self, category: &str, name: &str) -> bool {
        let Some(entry) = self.pool.remove(category, name) else {
            return false;
        };

        if let Some(connector) = entry {
            teardown(self.plugins.as_mut(), category, name, &connector);
        }
        debug!(category, name, "Evicted pooled connector");
        true
    }
}

impl fmt::Debug for ProfileRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileRegistry")
            .field("store", &self.store)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

fn resolve<'a>(
    store: &'a ProfileStore,
    category: &str,
    name: &str,
    require_exact: bool,
) -> Result<&'a Profile> {
    let name = if name.is_empty() { DEFAULT_PROFILE } else { name };

    if let Some(profile) = store.get(category, name) {
        return Ok(profile);
    }

    if !require_exact && let Some(profile) = store.get(category, DEFAULT_PROFILE) {
        return Ok(profile);
    }

    Err(ProfileError::not_found(category, name))
}

/// Resolved name of a profile, falling back to the requested name for untagged profiles
fn pool_key<'a>(profile: &'a Profile, requested: &'a str) -> &'a str {
    profile.name().unwrap_or(if requested.is_empty() {
        DEFAULT_PROFILE
    } else {
        requested
    })
}

fn teardown(plugins: &mut dyn PluginResolver, category: &str, name: &str, connector: &Connector) {
    if let Some(instances) = plugins.resolve(category).as_instance_plugin() {
        instances.close_instance_for_pool(name, connector);
        debug!(category, name, "Closed pooled connector");
    }
}
