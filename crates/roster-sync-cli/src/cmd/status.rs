use crate::output::{print_json, Table};
use anyhow::Context;
use roster_sync_core::config::Config;
use roster_sync_core::RecordStore;
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let store = RecordStore::open(&config.store_path(root)).context("failed to open store")?;
    let counts = store.counts().context("failed to count records")?;

    if json {
        return print_json(&counts);
    }

    Table::store_counts(&counts).print();
    Ok(())
}
