use crate::layout::RowMetrics;
use parley_client::config::{ClientConfig, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use std::{fs, io};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub page_size: usize,
    pub downloads_directory: Option<String>,
    pub timezone: Option<String>,
    pub show_scrollbar: bool,
    pub metrics: RowMetrics,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            downloads_directory: None,
            timezone: None,
            show_scrollbar: true,
            metrics: RowMetrics::default(),
        }
    }
}

impl Config {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::with_page_size(self.page_size)
    }
}

pub fn load_config(config_dir: &Path) -> Config {
    let config_path = config_dir.join("config.json");
    fs::read_to_string(config_path)
        .ok()
        .and_then(|data| serde_json::from_str::<Config>(&data).ok())
        .unwrap_or_default()
}

pub fn save_config(config_dir: &Path, config: &Config) -> io::Result<()> {
    let config_path = config_dir.join("config.json");
    let data = serde_json::to_string_pretty(config)?;
    let mut file = fs::File::create(config_path)?;
    file.write_all(data.as_bytes())?;
    Ok(())
}

/// Reads the username persisted by the login flow. This crate never writes it.
pub fn load_username(config_dir: &Path) -> Option<String> {
    fs::read_to_string(config_dir.join("username"))
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
