use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub appwrite: AppwriteConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppwriteConfig {
    #[serde(default = "default_appwrite_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub database_id: String,
    #[serde(default)]
    pub collection_id: String,
    /// Server API key. Browser-style anonymous access works without one.
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    #[serde(default = "default_genre_limit")]
    pub genre_limit: usize,
    #[serde(default = "default_trending_limit")]
    pub trending_limit: usize,
    #[serde(default = "default_genre")]
    pub default_genre: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_appwrite_endpoint() -> String {
    "https://cloud.appwrite.io/v1".to_string()
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_genre_limit() -> usize {
    12
}

fn default_trending_limit() -> usize {
    5
}

fn default_genre() -> String {
    "Action".to_string()
}

fn default_accent_color() -> String {
    "yellow".to_string()
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_tmdb_base_url(),
            image_base_url: default_image_base_url(),
            language: default_language(),
        }
    }
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            endpoint: default_appwrite_endpoint(),
            project_id: String::new(),
            database_id: String::new(),
            collection_id: String::new(),
            api_key: None,
        }
    }
}

impl AppwriteConfig {
    /// Analytics need all three identifiers; anything less disables them.
    pub fn is_configured(&self) -> bool {
        !self.project_id.is_empty() && !self.database_id.is_empty() && !self.collection_id.is_empty()
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            genre_limit: default_genre_limit(),
            trending_limit: default_trending_limit(),
            default_genre: default_genre(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            accent_color: default_accent_color(),
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "reelscout").ok_or(Error::NoConfigDir)
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", "reelscout")
        .map(|d| d.data_dir().to_path_buf())
        .ok_or(Error::NoDataDir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

impl Config {
    /// Load the user config, writing defaults on first run, then apply
    /// environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Override secrets and identifiers from the environment. Empty values
    /// are ignored so an unset variable never blanks out the file.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("TMDB_API_KEY") {
            self.tmdb.api_key = v;
        }
        if let Some(v) = get("APPWRITE_ENDPOINT") {
            self.appwrite.endpoint = v;
        }
        if let Some(v) = get("APPWRITE_PROJECT_ID") {
            self.appwrite.project_id = v;
        }
        if let Some(v) = get("APPWRITE_DATABASE_ID") {
            self.appwrite.database_id = v;
        }
        if let Some(v) = get("APPWRITE_COLLECTION_ID") {
            self.appwrite.collection_id = v;
        }
        if let Some(v) = get("APPWRITE_API_KEY") {
            self.appwrite.api_key = Some(v);
        }
    }
}
