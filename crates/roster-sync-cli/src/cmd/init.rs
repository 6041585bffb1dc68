use crate::output::print_json;
use anyhow::Context;
use roster_sync_core::config::Config;
use roster_sync_core::{paths, RecordStore, Roster};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let created = if config_path.exists() {
        false
    } else {
        Config::default()
            .save(root)
            .context("failed to write config")?;
        true
    };

    let config = Config::load(root).context("failed to load config")?;
    let store_path = config.store_path(root);
    RecordStore::open(&store_path)
        .with_context(|| format!("failed to open store at {}", store_path.display()))?;

    let roster_path = config.roster_path(root);
    let roster_created = Roster::write_template(&roster_path)
        .with_context(|| format!("failed to write roster {}", roster_path.display()))?;

    if json {
        print_json(&serde_json::json!({
            "config_created": created,
            "roster_created": roster_created,
            "config": config_path,
            "store": store_path,
            "roster": roster_path,
        }))?;
    } else {
        let verb = if created { "Initialized" } else { "Already initialized" };
        println!("{verb}: {}", paths::state_dir(root).display());
        println!("  store:  {}", store_path.display());
        println!("  roster: {}", roster_path.display());
    }
    Ok(())
}
