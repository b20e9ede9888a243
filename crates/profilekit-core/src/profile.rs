//! Profiles, parameter values and the consolidated profile store
//!
//! A profile is a flat parameter map. Every profile handed out by the
//! registry carries the reserved [`NAME_KEY`] parameter holding its resolved
//! name, which is also the connector pool key.

mod store;
mod value;

use std::collections::BTreeMap;
use std::collections::btree_map;

use serde::{Deserialize, Serialize};

pub use store::{CategoryProfiles, ProfileStore};
pub use value::Value;

/// Reserved parameter holding the resolved profile name
pub const NAME_KEY: &str = "_name";

/// Name looked up when the caller gives an empty profile name
pub const DEFAULT_PROFILE: &str = "default";

/// Reserved section name holding the parameters shared by a category
pub const COMMON_SECTION: &str = "__common__";

/// A named parameter set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile {
    params: BTreeMap<String, Value>,
}

impl Profile {
    /// Create an empty profile
    #[must_use]
    pub const fn new() -> Self {
        Self {
            params: BTreeMap::new(),
        }
    }

    /// Builder-style insertion
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Resolved profile name, if the profile has been tagged
    pub fn name(&self) -> Option<&str> {
        self.params.get(NAME_KEY).and_then(Value::as_str)
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Look up a text parameter
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Set a parameter, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.params.insert(key.into(), value.into())
    }

    /// Remove a parameter
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.params.remove(key)
    }

    /// Whether the parameter is set
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of parameters, including [`NAME_KEY`] when tagged
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the profile has no parameters
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Iterate over parameters in key order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.params.iter()
    }

    /// Layer this profile over `common`; keys set here win
    #[must_use]
    pub fn merged_over(&self, common: &Self) -> Self {
        let mut params = common.params.clone();
        params.extend(self.params.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self { params }
    }

    pub(crate) fn tag_name(&mut self, name: &str) {
        self.params
            .insert(NAME_KEY.to_string(), Value::Text(name.to_string()));
    }
}

impl<K, V> FromIterator<(K, V)> for Profile
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Profile {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl IntoIterator for Profile {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.into_iter()
    }
}
