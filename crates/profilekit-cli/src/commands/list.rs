use std::fmt::Write;

use profilekit_core::ProfileStore;

use crate::commands::LoadOptions;

pub struct List;

impl List {
    pub fn execute(options: &LoadOptions) -> anyhow::Result<()> {
        let (_, registry) = options.load_registry()?;

        print!("{}", Self::render(registry.store()));
        Ok(())
    }

    fn render(store: &ProfileStore) -> String {
        let mut out = String::new();

        for (category, record) in store.iter() {
            let _ = writeln!(out, "{category}");

            for (name, _) in record.own_profiles() {
                let _ = writeln!(out, "  {name}");
            }

            for (alias, target) in &record.aliases {
                if record.get(alias).is_some() {
                    let _ = writeln!(out, "  {alias} -> {target}");
                } else {
                    let _ = writeln!(out, "  {alias} -> {target} (unresolved)");
                }
            }
        }

        out
    }
}
