use crate::output::print_json;
use anyhow::Context;
use roster_sync_core::config::Config;
use roster_sync_core::store::Snapshot;
use roster_sync_core::RecordStore;
use std::path::Path;

pub fn run(root: &Path, file: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let snapshot = Snapshot::load(file)
        .with_context(|| format!("failed to read snapshot {}", file.display()))?;

    let store = RecordStore::open(&config.store_path(root)).context("failed to open store")?;
    store.import(&snapshot).context("import failed")?;
    let counts = store.counts().context("failed to count records")?;

    tracing::debug!(file = %file.display(), "snapshot imported");
    if json {
        print_json(&counts)?;
    } else {
        println!("Imported {}", file.display());
    }
    Ok(())
}
