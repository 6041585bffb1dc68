use crate::output::{print_json, Table};
use anyhow::Context;
use roster_sync_core::config::Config;
use roster_sync_core::messaging::{Disconnected, Messaging};
use roster_sync_core::{DiscordMessaging, RecordStore, Roster, SyncEngine, SyncResult};
use std::path::Path;

pub fn run(root: &Path, roster_file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;

    let roster_path = match roster_file {
        Some(p) => p.to_path_buf(),
        None => config.roster_path(root),
    };
    let roster = Roster::load(&roster_path)
        .with_context(|| format!("failed to read roster {}", roster_path.display()))?;
    roster.ensure_non_empty(config.roster.allow_empty)?;

    let store = RecordStore::open(&config.store_path(root)).context("failed to open store")?;

    // Only reach for the platform when some surface is bound.
    let messaging: Box<dyn Messaging> = if config.surfaces.is_empty() {
        Box::new(Disconnected)
    } else {
        Box::new(
            DiscordMessaging::from_config(&config.discord)
                .context("failed to set up messaging client")?,
        )
    };

    let span = tracing::info_span!("sync", roster = %roster_path.display());
    let engine = SyncEngine::new(&store, messaging.as_ref()).with_span(span);

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(engine.execute_full_sync(&roster, &config.surfaces))?;

    if json {
        print_json(&result.summary())?;
    } else {
        print_summary(&result);
    }
    Ok(())
}

fn print_summary(result: &SyncResult) {
    Table::sync_counters(result).print();
    println!();

    if !result.skipped_surfaces().is_empty() {
        let skipped: Vec<&str> = result.skipped_surfaces().iter().map(|s| s.as_str()).collect();
        println!("Skipped message checks (no binding): {}", skipped.join(", "));
    }
    if result.has_changes() {
        println!("Sync complete: {} change(s).", result.total_changes());
    } else {
        println!("Sync complete: already consistent.");
    }
}
