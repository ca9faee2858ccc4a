//! Application configuration for Draftmill.
//!
//! User config lives at `~/.draftmill/draftmill.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DraftmillError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "draftmill.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".draftmill";

// ---------------------------------------------------------------------------
// Config structs (matching draftmill.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External body-generation settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path to the topic catalog file.
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Path to the selection state file.
    #[serde(default = "default_state_path")]
    pub state_path: String,

    /// Directory where draft artifacts are written.
    #[serde(default = "default_drafts_dir")]
    pub drafts_dir: String,

    /// Minimum cooldown gap between repeats. 0 derives it from catalog size.
    #[serde(default)]
    pub min_gap: usize,

    /// Maximum retained history records. 0 derives it from catalog size.
    #[serde(default)]
    pub history_limit: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            state_path: default_state_path(),
            drafts_dir: default_drafts_dir(),
            min_gap: 0,
            history_limit: 0,
        }
    }
}

fn default_catalog_path() -> String {
    "config/topics.toml".into()
}
fn default_state_path() -> String {
    ".draftmill/state.json".into()
}
fn default_drafts_dir() -> String {
    "drafts".into()
}

/// `[generator]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// External command producing body text. Empty disables generation.
    #[serde(default)]
    pub command: String,

    /// Extra arguments passed to the command.
    #[serde(default)]
    pub args: Vec<String>,

    /// Path to the prompt template file.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,

    /// Seconds to wait for the generator before falling back.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            prompt_template: default_prompt_template(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_prompt_template() -> String {
    "config/prompt_template.txt".into()
}
fn default_timeout_secs() -> u64 {
    90
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.draftmill/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| DraftmillError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.draftmill/draftmill.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| DraftmillError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| DraftmillError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| DraftmillError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| DraftmillError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| DraftmillError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
