use crate::error::{Result, SyncError};
use crate::paths;
use crate::types::{Surface, SurfaceBindings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

fn default_store_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_STORE_FILE)
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// RosterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    #[serde(default = "default_roster_path")]
    pub path: PathBuf,
    /// Allow a sync with an empty roster, which removes every member.
    #[serde(default)]
    pub allow_empty: bool,
}

fn default_roster_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_ROSTER_FILE)
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            path: default_roster_path(),
            allow_empty: false,
        }
    }
}

// ---------------------------------------------------------------------------
// DiscordConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Name of the env var holding the bot token. The token itself is never stored.
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_token_env() -> String {
    "DISCORD_BOT_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub surfaces: SurfaceBindings,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            store: StoreConfig::default(),
            roster: RosterConfig::default(),
            discord: DiscordConfig::default(),
            surfaces: SurfaceBindings::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(SyncError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        if cfg.version != 1 {
            return Err(SyncError::Config(format!(
                "unsupported config version {}",
                cfg.version
            )));
        }
        Ok(cfg)
    }

    /// Write the config through a tempfile in the state dir, then rename it in place.
    pub fn save(&self, root: &Path) -> Result<()> {
        let dir = paths::state_dir(root);
        std::fs::create_dir_all(&dir)?;
        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_yaml::to_writer(&mut tmp, self)?;
        tmp.persist(paths::config_path(root)).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn store_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.store.path)
    }

    pub fn roster_path(&self, root: &Path) -> PathBuf {
        paths::resolve(root, &self.roster.path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.surfaces.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no surfaces configured: stale message references will not be checked"
                    .to_string(),
            });
        }

        for surface in Surface::all() {
            if let Some(binding) = self.surfaces.get(*surface) {
                if !paths::is_snowflake(&binding.channel_id) {
                    warnings.push(ConfigWarning {
                        level: WarnLevel::Error,
                        message: format!(
                            "surface '{}' has invalid channel id '{}'",
                            surface, binding.channel_id
                        ),
                    });
                }
            }
        }

        if self.discord.timeout_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "discord.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.discord.token_env.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "discord.token_env is empty".to_string(),
            });
        }

        if self.roster.allow_empty {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "roster.allow_empty is set: an empty roster will remove every member"
                    .to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
