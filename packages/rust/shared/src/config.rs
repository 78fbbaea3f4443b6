//! Application configuration for seenlist.
//!
//! User config lives at `~/.seenlist/seenlist.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SeenlistError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "seenlist.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".seenlist";

// ---------------------------------------------------------------------------
// Config structs (matching seenlist.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where the movie list is scraped from.
    #[serde(default)]
    pub source: SourceConfig,

    /// TMDB settings.
    #[serde(default)]
    pub tmdb: TmdbSection,

    /// Resolution pipeline tuning.
    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Output file settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Wiki page listing the movies.
    #[serde(default = "default_wiki_url")]
    pub wiki_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            wiki_url: default_wiki_url(),
        }
    }
}

impl SourceConfig {
    /// Parse the configured wiki URL.
    pub fn url(&self) -> Result<Url> {
        Url::parse(&self.wiki_url).map_err(|e| {
            SeenlistError::validation(format!("invalid wiki URL '{}': {e}", self.wiki_url))
        })
    }
}

fn default_wiki_url() -> String {
    "https://comedybangbang.fandom.com/wiki/Scott_Hasn%27t_Seen".into()
}

/// `[tmdb]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbSection {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Prefix joined with a result's `poster_path`.
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Search language.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TmdbSection {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            poster_base_url: default_poster_base_url(),
            language: default_language(),
        }
    }
}

fn default_api_key_env() -> String {
    "TMDB_API_KEY".into()
}
fn default_base_url() -> String {
    "https://api.themoviedb.org/3".into()
}
fn default_poster_base_url() -> String {
    "https://www.themoviedb.org/t/p/w300_and_h450_bestv2".into()
}
fn default_language() -> String {
    "en-US".into()
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Maximum resolutions in flight.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause each task takes after its lookups, before giving up its slot.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_ms: u64,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            rate_limit_ms: default_rate_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_concurrency() -> usize {
    5
}
fn default_rate_limit() -> u64 {
    250
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the JSON list is written to.
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name without extension.
    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    /// Also write a `<stem>_<timestamp>.json` snapshot.
    #[serde(default = "default_true")]
    pub timestamped: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            file_stem: default_file_stem(),
            timestamped: true,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_file_stem() -> String {
    "scott_hasnt_seen".into()
}
fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Admission gate width.
    pub concurrency: usize,
    /// Delay held by each task before releasing its slot.
    pub rate_limit: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.pipeline.concurrency,
            rate_limit: Duration::from_millis(config.pipeline.rate_limit_ms),
        }
    }
}

/// Runtime TMDB client configuration, including the resolved API key.
#[derive(Debug, Clone)]
pub struct TmdbConfig {
    pub api_key: String,
    pub base_url: String,
    pub poster_base_url: String,
    pub language: String,
    pub timeout: Duration,
}

impl TmdbConfig {
    /// Build from the file config and an already-resolved key.
    pub fn new(config: &AppConfig, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: config.tmdb.base_url.trim_end_matches('/').to_string(),
            poster_base_url: config.tmdb.poster_base_url.clone(),
            language: config.tmdb.language.clone(),
            timeout: Duration::from_secs(config.pipeline.timeout_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.seenlist/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SeenlistError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.seenlist/seenlist.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SeenlistError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SeenlistError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SeenlistError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SeenlistError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SeenlistError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the TMDB API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.tmdb.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val.trim().to_string()),
        _ => Err(SeenlistError::config(format!(
            "TMDB API key not found. Set the {var_name} environment variable.\n\
             Get a key at https://www.themoviedb.org/settings/api"
        ))),
    }
}
