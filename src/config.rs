use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persisted user defaults, used when a flag is not given on the command line.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub hotspot_x: i32,
    #[serde(default)]
    pub hotspot_y: i32,
    #[serde(default = "default_log_level")]
    pub log_level: String, // "off", "error", "warn", "info", "debug", "trace"
}

fn default_log_level() -> String { "info".to_string() }

impl Default for Config {
    fn default() -> Self {
        Self {
            hotspot_x: 0,
            hotspot_y: 0,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Falls back to `Info` for anything `log` does not recognise.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

pub fn get_config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_default()
        .join("png2cur");
    config_dir.join("config.json")
}

pub fn load_config() -> Config {
    load_config_from(&get_config_path())
}

pub fn load_config_from(path: &Path) -> Config {
    if path.exists() {
        let data = std::fs::read_to_string(path).unwrap_or_default();
        serde_json::from_str(&data).unwrap_or_default()
    } else {
        Config::default()
    }
}

pub fn save_config(config: &Config) -> anyhow::Result<PathBuf> {
    let path = get_config_path();
    save_config_to(config, &path)?;
    Ok(path)
}

pub fn save_config_to(config: &Config, path: &Path) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let data = serde_json::to_string_pretty(config)?;
    std::fs::write(path, data)?;
    Ok(())
}
