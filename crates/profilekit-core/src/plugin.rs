//! Category plugins
//!
//! A plugin owns the normalization rules of one category. The compiler
//! feeds it alias, common and profile sections, then asks it to write the
//! consolidated category into a [`ProfileStore`]. Plugins may additionally
//! build and tear down the connectors pooled for their category by exposing
//! a [`ProfileInstancePlugin`] through [`ProfilePlugin::as_instance_plugin`].

mod category;
mod resolver;

use std::collections::BTreeMap;

pub use category::{CategoryHooks, CategoryPlugin, PassThrough};
pub use resolver::{PluginResolver, PluginSet};

use crate::profile::{Profile, ProfileStore};
use crate::registry::Connector;

/// Accumulates the raw sections of a category and emits normalized profiles
pub trait ProfilePlugin {
    /// Record the alias map of the category, replacing any previous one
    fn set_aliases(&mut self, aliases: BTreeMap<String, String>);

    /// Record the parameters shared by every profile; the last call wins
    fn set_common(&mut self, common: Profile);

    /// Register the raw parameters of one profile
    fn add_profile(&mut self, name: &str, params: Profile);

    /// Seed already-normalized profiles that must be emitted unchanged
    fn add_profiles(&mut self, profiles: BTreeMap<String, Profile>);

    /// Write the consolidated category into `out`, replacing its slot
    ///
    /// Accumulated state is consumed, leaving the plugin ready for the next
    /// compilation pass.
    fn get_profiles(&mut self, out: &mut ProfileStore);

    /// Connector construction capability, when the plugin has one
    fn as_instance_plugin(&self) -> Option<&dyn ProfileInstancePlugin> {
        None
    }
}

/// Builds and releases the connectors pooled for a category
pub trait ProfileInstancePlugin {
    /// Build a connector from a resolved profile
    ///
    /// Returning `None` means the profile does not describe a connector
    /// this plugin can build. It is cached like any other result.
    fn get_instance_for_pool(&self, name: &str, profile: &Profile) -> Option<Connector>;

    /// Release the resources held by a connector this plugin built
    fn close_instance_for_pool(&self, name: &str, connector: &Connector);
}
