//! Mapping from category names to plugin instances

use std::collections::HashMap;
use std::fmt;

use super::{CategoryPlugin, ProfilePlugin};

/// Supplies the plugin responsible for a category
pub trait PluginResolver {
    /// Return the plugin for `category`, constructing it on first use
    fn resolve(&mut self, category: &str) -> &mut dyn ProfilePlugin;
}

type PluginConstructor = Box<dyn FnOnce(&str) -> Box<dyn ProfilePlugin>>;
type FallbackConstructor = Box<dyn FnMut(&str) -> Box<dyn ProfilePlugin>>;

/// Plugin resolver backed by explicit registrations and a fallback
///
/// Plugins are built at most once per category and reused afterwards.
/// Categories without a registration get a pass-through [`CategoryPlugin`]
/// unless another fallback was configured with [`PluginSet::from_fn`].
pub struct PluginSet {
    plugins: HashMap<String, Box<dyn ProfilePlugin>>,
    constructors: HashMap<String, PluginConstructor>,
    fallback: FallbackConstructor,
}

impl PluginSet {
    /// Create a resolver handing out pass-through plugins
    #[must_use]
    pub fn new() -> Self {
        Self::from_fn(|category| Box::new(CategoryPlugin::new(category)))
    }

    /// Create a resolver building every plugin with `fallback`
    pub fn from_fn<F>(fallback: F) -> Self
    where
        F: FnMut(&str) -> Box<dyn ProfilePlugin> + 'static,
    {
        Self {
            plugins: HashMap::new(),
            constructors: HashMap::new(),
            fallback: Box::new(fallback),
        }
    }

    /// Register a ready plugin instance for `category`
    #[must_use]
    pub fn with_plugin<P>(mut self, category: impl Into<String>, plugin: P) -> Self
    where
        P: ProfilePlugin + 'static,
    {
        let category = category.into();
        self.constructors.remove(&category);
        self.plugins.insert(category, Box::new(plugin));
        self
    }

    /// Register a constructor run the first time `category` is resolved
    #[must_use]
    pub fn with_constructor<F>(mut self, category: impl Into<String>, constructor: F) -> Self
    where
        F: FnOnce(&str) -> Box<dyn ProfilePlugin> + 'static,
    {
        let category = category.into();
        self.plugins.remove(&category);
        self.constructors.insert(category, Box::new(constructor));
        self
    }

    /// Whether a plugin instance already exists for `category`
    pub fn is_resolved(&self, category: &str) -> bool {
        self.plugins.contains_key(category)
    }
}

impl Default for PluginSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut resolved: Vec<&String> = self.plugins.keys().collect();
        resolved.sort();
        let mut deferred: Vec<&String> = self.constructors.keys().collect();
        deferred.sort();

        f.debug_struct("PluginSet")
            .field("resolved", &resolved)
            .field("deferred", &deferred)
            .finish_non_exhaustive()
    }
}

impl PluginResolver for PluginSet {
    fn resolve(&mut self, category: &str) -> &mut dyn ProfilePlugin {
        let Self {
            plugins,
            constructors,
            fallback,
        } = self;

        plugins
            .entry(category.to_string())
            .or_insert_with(|| match constructors.remove(category) {
                Some(constructor) => constructor(category),
                None => fallback(category),
            })
            .as_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::plugin::CategoryHooks;
    use crate::profile::{Profile, ProfileStore};

    struct Upper;

    impl CategoryHooks for Upper {
        fn normalize(&self, _category: &str, _name: &str, mut profile: Profile) -> Profile {
            profile.insert("normalized", true);
            profile
        }
    }

    #[test]
    fn test_default_resolver_builds_pass_through_plugins() {
        let mut set = PluginSet::new();
        assert!(!set.is_resolved("db"));

        let plugin = set.resolve("db");
        plugin.add_profile("main", Profile::new().with("host", "h"));
        let mut store = ProfileStore::new();
        plugin.get_profiles(&mut store);

        assert!(set.is_resolved("db"));
        assert_eq!(store.get("db", "main").unwrap().len(), 2);
    }

    #[test]
    fn test_resolved_plugin_is_reused() {
        let mut set = PluginSet::new();
        set.resolve("db")
            .add_profile("main", Profile::new().with("host", "h"));

        // Same instance: the profile added above is still pending.
        let mut store = ProfileStore::new();
        set.resolve("db").get_profiles(&mut store);
        assert!(store.get("db", "main").is_some());
    }

    #[test]
    fn test_constructor_runs_once_on_first_use() {
        let built = Rc::new(Cell::new(0));
        let counter = Rc::clone(&built);
        let mut set = PluginSet::new().with_constructor("foo", move |category| {
            counter.set(counter.get() + 1);
            Box::new(CategoryPlugin::with_hooks(category, Upper))
        });

        assert_eq!(built.get(), 0);
        set.resolve("foo").add_profile("a", Profile::new());
        set.resolve("foo").add_profile("b", Profile::new());
        assert_eq!(built.get(), 1);

        let mut store = ProfileStore::new();
        set.resolve("foo").get_profiles(&mut store);
        assert_eq!(
            store.get("foo", "b").unwrap().get("normalized").and_then(|v| v.as_bool()),
            Some(true)
        );
    }

    #[test]
    fn test_from_fn_fallback() {
        let mut set = PluginSet::from_fn(|category| {
            Box::new(CategoryPlugin::with_hooks(category, Upper))
        })
        .with_plugin("plain", CategoryPlugin::new("plain"));

        let mut store = ProfileStore::new();
        set.resolve("fancy").add_profile("x", Profile::new());
        set.resolve("fancy").get_profiles(&mut store);
        set.resolve("plain").add_profile("y", Profile::new());
        set.resolve("plain").get_profiles(&mut store);

        assert!(store.get("fancy", "x").unwrap().contains_key("normalized"));
        assert!(!store.get("plain", "y").unwrap().contains_key("normalized"));
    }

    #[test]
    fn test_debug_lists_categories() {
        let set = PluginSet::new()
            .with_plugin("b", CategoryPlugin::new("b"))
            .with_constructor("a", |category| Box::new(CategoryPlugin::new(category)));

        let rendered = format!("{set:?}");
        assert!(rendered.contains("resolved: [\"b\"]"));
        assert!(rendered.contains("deferred: [\"a\"]"));
    }
}
