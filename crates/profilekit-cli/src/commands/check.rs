use std::fmt::Write;
use std::path::Path;

use profilekit_core::ProfileStore;
use profilekit_core::profile::DEFAULT_PROFILE;

use crate::commands::LoadOptions;

pub struct Check;

impl Check {
    pub fn execute(options: &LoadOptions) -> anyhow::Result<()> {
        let (source, registry) = options.load_registry()?;

        print!("{}", Self::report(&source, registry.store()));
        Ok(())
    }

    fn report(source: &Path, store: &ProfileStore) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}: {} categories",
            source.display(),
            store.len()
        );

        for (category, record) in store.iter() {
            let _ = writeln!(
                out,
                "  {category}: {} profiles, {} aliases",
                record.own_profiles().count(),
                record.aliases.len()
            );

            if record.get(DEFAULT_PROFILE).is_none() {
                let _ = writeln!(out, "  warning: no default profile for \"{category}\"");
            }

            for (alias, target) in &record.aliases {
                if record.get(alias).is_none() {
                    let _ = writeln!(
                        out,
                        "  warning: alias \"{alias}\" of \"{category}\" points to unknown profile \"{target}\""
                    );
                }
            }
        }

        out
    }
}
