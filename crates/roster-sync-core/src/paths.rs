use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const STATE_DIR: &str = ".roster-sync";
pub const CONFIG_FILE: &str = ".roster-sync/config.yaml";
pub const DEFAULT_STORE_FILE: &str = ".roster-sync/store.redb";
pub const DEFAULT_ROSTER_FILE: &str = "roster.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a config-relative path against the project root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

// ---------------------------------------------------------------------------
// Channel id validation
// ---------------------------------------------------------------------------

static SNOWFLAKE_RE: OnceLock<Regex> = OnceLock::new();

fn snowflake_re() -> &'static Regex {
    SNOWFLAKE_RE.get_or_init(|| Regex::new(r"^[0-9]{1,20}$").unwrap())
}

/// Platform ids are unsigned 64-bit integers rendered in decimal.
pub fn is_snowflake(id: &str) -> bool {
    snowflake_re().is_match(id) && id.parse::<u64>().is_ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
