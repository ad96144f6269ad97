use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::list_view::PageSizes;
use crate::types::Resource;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub token_env: Option<String>,
    pub token_command: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4000/api/".to_string(),
            token_env: Some("CINE_ADMIN_TOKEN".to_string()),
            token_command: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub search_debounce_ms: u64,
    pub notification_secs: u64,
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 600,
            notification_secs: 6,
            log_level: "warn".to_string(),
        }
    }
}

impl UiConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }
}

/// Page-size choices per list; the first entry is the default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListsConfig {
    pub movies: Vec<u32>,
    pub rooms: Vec<u32>,
    pub showtimes: Vec<u32>,
    pub invoices: Vec<u32>,
    pub reports: Vec<u32>,
    pub users: Vec<u32>,
}

impl Default for ListsConfig {
    fn default() -> Self {
        Self {
            movies: vec![3, 6, 9],
            rooms: vec![10, 20, 30],
            showtimes: vec![10, 20, 30],
            invoices: vec![10, 20, 30],
            reports: vec![10, 20, 30],
            users: vec![10, 20, 30],
        }
    }
}

impl ListsConfig {
    pub fn page_sizes(&self, resource: Resource) -> PageSizes {
        let sizes = match resource {
            Resource::Movies => &self.movies,
            Resource::Rooms => &self.rooms,
            Resource::Showtimes => &self.showtimes,
            Resource::Invoices => &self.invoices,
            Resource::Reports => &self.reports,
            Resource::Users => &self.users,
        };
        PageSizes::new(sizes)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub lists: ListsConfig,
}

/// Directory holding the config file and the stored token.
pub fn config_dir() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("cine-admin"))
}

fn config_path() -> Option<PathBuf> {
    Some(config_dir()?.join("config.toml"))
}

impl Config {
    /// Read `path`, or the default location when none is given. A missing
    /// or unreadable file yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Config::default();
        };

        Self::parse(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults");
            Config::default()
        })
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
