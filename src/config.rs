// Configuration Module

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, bail};
use clap::Parser;
use directories::{ProjectDirs, UserDirs};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub page_size: usize,
    pub count_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub log_level: String,
    pub download_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            count_interval_secs: 5,
            request_timeout_secs: 10,
            log_level: "info".to_string(),
            download_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.server_url.trim().is_empty() {
            bail!("server_url cannot be empty");
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.count_interval_secs == 0 {
            bail!("count_interval_secs must be at least 1");
        }
        self.log_filter()?;
        Ok(())
    }

    pub fn log_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .with_context(|| format!("unknown log level: {}", self.log_level))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn count_interval(&self) -> Duration {
        Duration::from_secs(self.count_interval_secs)
    }

    /// Where saved `.torrent` files go: the configured directory, else the
    /// user's download folder, else the working directory.
    pub fn resolved_download_dir(&self) -> PathBuf {
        if let Some(dir) = &self.download_dir {
            return dir.clone();
        }
        UserDirs::new()
            .and_then(|dirs| dirs.download_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

/// Command-line overrides; anything left unset falls back to the file.
#[derive(Parser, Debug, Default)]
#[command(name = "bitsearch", version, about = "Browse a torrent search service from the terminal")]
pub struct Cli {
    /// Base URL of the search service
    #[arg(long)]
    pub server: Option<String>,
    /// Results per page
    #[arg(long)]
    pub page_size: Option<usize>,
    /// Config file to use instead of the default location
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    pub log_level: Option<String>,
    /// Log file to use instead of the default location
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Save the effective configuration back to the config file
    #[arg(long)]
    pub write_config: bool,
}

impl Cli {
    pub fn apply(&self, config: &mut Config) {
        if let Some(server) = &self.server {
            config.server_url = server.clone();
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "bitsearch").context("Could not determine project directories")
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

pub fn default_data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn load_config(config_path: &Path) -> Result<Config> {
    if !config_path.exists() {
        return Ok(Config::default());
    }
    let contents = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

pub fn save_config(config: &Config, config_path: &Path) -> Result<()> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
    }
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(config_path, contents)
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))
}
