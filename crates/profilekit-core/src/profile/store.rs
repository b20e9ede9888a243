//! Consolidated per-category profile storage

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::Profile;

/// Everything known about one category once it has been consolidated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfiles {
    /// Alias name to target profile name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub aliases: BTreeMap<String, String>,

    /// Parameters shared by every profile of the category
    #[serde(default, skip_serializing_if = "Profile::is_empty")]
    pub common: Profile,

    /// Normalized profiles, alias entries included as full copies
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl CategoryProfiles {
    /// Look up a profile or alias copy by name
    pub fn get(&self, name: &str) -> Option<&Profile> {
        self.profiles.get(name)
    }

    /// Profiles stored under their own resolved name, alias copies excluded
    pub fn own_profiles(&self) -> impl Iterator<Item = (&String, &Profile)> {
        self.profiles
            .iter()
            .filter(|(name, profile)| profile.name() == Some(name.as_str()))
    }

    /// Whether `name` is an alias of another profile
    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Whether `name` holds a profile stored under its own resolved name
    pub fn is_own_profile(&self, name: &str) -> bool {
        is_own_profile(&self.profiles, name)
    }

    /// Refresh the copy stored under every alias from the profile it leads to
    ///
    /// Aliases may point at other aliases. An alias that does not lead to a
    /// profile, directly or through a chain, keeps whatever it held before.
    pub fn expand_aliases(&mut self, category: &str) {
        for (alias, target) in &self.aliases {
            let copy = resolve_alias(alias, &self.aliases, &self.profiles)
                .and_then(|resolved| self.profiles.get(resolved))
                .cloned();

            match copy {
                Some(copy) => {
                    self.profiles.insert(alias.clone(), copy);
                }
                None => {
                    warn!(
                        category,
                        alias = %alias,
                        target = %target,
                        "Alias does not lead to a profile, ignoring it"
                    );
                }
            }
        }
    }
}

fn is_own_profile(profiles: &BTreeMap<String, Profile>, name: &str) -> bool {
    profiles
        .get(name)
        .is_some_and(|profile| profile.name() == Some(name))
}

/// Follow an alias (possibly through other aliases) to a real profile name
fn resolve_alias<'a>(
    alias: &str,
    aliases: &'a BTreeMap<String, String>,
    profiles: &BTreeMap<String, Profile>,
) -> Option<&'a str> {
    let mut current = aliases.get(alias)?;

    for _ in 0..=aliases.len() {
        if is_own_profile(profiles, current) {
            return Some(current.as_str());
        }
        current = aliases.get(current)?;
    }

    // More hops than aliases: the chain loops.
    None
}

/// Consolidated mapping `category -> profile name -> profile`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileStore {
    categories: BTreeMap<String, CategoryProfiles>,
}

impl ProfileStore {
    /// Create an empty store
    #[must_use]
    pub const fn new() -> Self {
        Self {
            categories: BTreeMap::new(),
        }
    }

    /// Look up a profile
    pub fn get(&self, category: &str, name: &str) -> Option<&Profile> {
        self.categories.get(category)?.get(name)
    }

    /// Borrow a category record
    pub fn category(&self, category: &str) -> Option<&CategoryProfiles> {
        self.categories.get(category)
    }

    /// Mutably borrow a category record
    pub fn category_mut(&mut self, category: &str) -> Option<&mut CategoryProfiles> {
        self.categories.get_mut(category)
    }

    /// Replace a whole category, returning the previous record
    pub fn replace_category(
        &mut self,
        category: impl Into<String>,
        profiles: CategoryProfiles,
    ) -> Option<CategoryProfiles> {
        self.categories.insert(category.into(), profiles)
    }

    /// Category names in order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Iterate over category records in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryProfiles)> {
        self.categories
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no category is known
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Drop every category
    pub fn clear(&mut self) {
        self.categories.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_category() -> CategoryProfiles {
        let mut server1 = Profile::new().with("host", "db1");
        server1.tag_name("server1");

        let mut record = CategoryProfiles::default();
        record
            .aliases
            .insert("default".to_string(), "server1".to_string());
        record
            .profiles
            .insert("default".to_string(), server1.clone());
        record.profiles.insert("server1".to_string(), server1);
        record
    }

    #[test]
    fn test_own_profiles_skip_alias_copies() {
        let record = sample_category();
        let own: Vec<&String> = record.own_profiles().map(|(name, _)| name).collect();

        assert_eq!(own, vec!["server1"]);
        assert!(record.is_alias("default"));
        assert!(!record.is_alias("server1"));
    }

    #[test]
    fn test_replace_category() {
        let mut store = ProfileStore::new();
        assert!(store.replace_category("db", sample_category()).is_none());
        assert!(store.replace_category("db", CategoryProfiles::default()).is_some());

        assert_eq!(store.len(), 1);
        assert!(store.get("db", "server1").is_none());
    }

    #[test]
    fn test_expand_aliases_follows_redefined_target() {
        let mut server2 = Profile::new().with("host", "db2");
        server2.tag_name("server2");

        let mut record = sample_category();
        record.profiles.insert("server2".to_string(), server2.clone());
        record.profiles.insert("server1".to_string(), server2.clone());
        record
            .aliases
            .insert("server1".to_string(), "server2".to_string());
        record
            .aliases
            .insert("ghost".to_string(), "nowhere".to_string());

        record.expand_aliases("db");

        assert_eq!(record.get("default"), Some(&server2));
        assert!(!record.is_own_profile("server1"));
        assert!(record.is_own_profile("server2"));
        assert!(record.get("ghost").is_none());
    }

    #[test]
    fn test_store_json_round_trip() {
        let mut store = ProfileStore::new();
        store.replace_category("db", sample_category());

        let json = serde_json::to_string(&store).unwrap();
        let back: ProfileStore = serde_json::from_str(&json).unwrap();

        assert_eq!(back, store);
        assert_eq!(back.get("db", "default").and_then(Profile::name), Some("server1"));
    }
}
