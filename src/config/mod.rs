use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Overrides `notify.topic` after every other source has been applied.
pub const TOPIC_ENV: &str = "NTFY_TOPIC";

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Listing-page fetch configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScraperConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_index_path")]
    pub index_path: String,

    #[serde(default = "default_unit_type")]
    pub unit_type: String,

    #[serde(default = "default_page")]
    pub page: u32,

    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_accept_language")]
    pub accept_language: String,
}

/// Seen-set storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default = "default_seen_path")]
    pub seen_path: PathBuf,
}

/// ntfy configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    #[serde(default = "default_ntfy_server")]
    pub server: String,

    #[serde(default = "default_topic")]
    pub topic: String,

    #[serde(default = "default_tags")]
    pub tags: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_true")]
    pub include_room_type: bool,

    #[serde(default = "default_true")]
    pub include_availability: bool,

    #[serde(default = "default_true")]
    pub include_badges: bool,
}

/// Which new listings are worth a notification
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Exact, case-sensitive city names. Empty means every city.
    #[serde(default = "default_allowed_cities")]
    pub allowed_cities: Vec<String>,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_base_url() -> String {
    "https://www.klikenhuur.nl".to_string()
}
fn default_index_path() -> String {
    "/woning-overzicht".to_string()
}
fn default_unit_type() -> String {
    "Appartement".to_string()
}
fn default_page() -> u32 {
    1
}
fn default_page_size() -> u32 {
    240
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}
fn default_accept_language() -> String {
    "en-US,en;q=0.5".to_string()
}
fn default_seen_path() -> PathBuf {
    PathBuf::from("seen_listings.json")
}
fn default_ntfy_server() -> String {
    "https://ntfy.sh".to_string()
}
fn default_topic() -> String {
    "klikenhuur-deniz".to_string()
}
fn default_tags() -> String {
    "house".to_string()
}
fn default_true() -> bool {
    true
}
fn default_allowed_cities() -> Vec<String> {
    vec!["Nijmegen".to_string(), "Arnhem".to_string()]
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::Environment::with_prefix("KLIKENHUUR")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("filter.allowed_cities")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        let mut app_cfg: AppConfig = cfg
            .try_deserialize()
            .context("Invalid configuration")?;

        app_cfg.apply_topic_override(std::env::var(TOPIC_ENV).ok());

        let exe = std::env::current_exe().context("Failed to locate the executable")?;
        app_cfg.anchor_seen_path(exe.parent());
        Ok(app_cfg)
    }

    /// A relative `storage.seen_path` lives next to the executable, so cron
    /// and manual runs share one seen-set whatever their working directory.
    pub fn anchor_seen_path(&mut self, exe_dir: Option<&Path>) {
        if let Some(dir) = exe_dir.filter(|_| self.storage.seen_path.is_relative()) {
            self.storage.seen_path = dir.join(&self.storage.seen_path);
        }
    }

    /// `NTFY_TOPIC` wins over files and prefixed variables; blank is ignored.
    pub fn apply_topic_override(&mut self, topic: Option<String>) {
        if let Some(topic) = topic.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
            self.notify.topic = topic;
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index_path: default_index_path(),
            unit_type: default_unit_type(),
            page: default_page(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { seen_path: default_seen_path() }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            server: default_ntfy_server(),
            topic: default_topic(),
            tags: default_tags(),
            timeout_secs: default_timeout_secs(),
            include_room_type: true,
            include_availability: true,
            include_badges: true,
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { allowed_cities: default_allowed_cities() }
    }
}
