use anyhow::Context;
use profilekit_core::Profile;

use crate::commands::LoadOptions;

pub struct Show;

impl Show {
    pub fn execute(
        category: &str,
        name: Option<&str>,
        exact: bool,
        json: bool,
        options: &LoadOptions,
    ) -> anyhow::Result<()> {
        let (_, registry) = options.load_registry()?;

        let profile = registry.get(category, name.unwrap_or_default(), exact)?;

        if json {
            let text = serde_json::to_string_pretty(profile)
                .context("Failed to serialize profile")?;
            println!("{text}");
        } else {
            print!("{}", Self::render(profile));
        }

        Ok(())
    }

    /// `key = value` lines in key order
    fn render(profile: &Profile) -> String {
        profile
            .iter()
            .map(|(key, value)| format!("{key} = {value}\n"))
            .collect()
    }
}
