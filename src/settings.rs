use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanGoError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Workbook (or CSV directory) used when no `--workbook` is given.
    #[serde(default)]
    pub workbook: Option<String>,
    #[serde(default = "default_export_dir")]
    pub export_dir: String,
    #[serde(default = "default_top_items")]
    pub top_items: usize,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_file: Option<String>,
}

fn default_export_dir() -> String {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("scango")
        .to_string_lossy()
        .to_string()
}

fn default_top_items() -> usize {
    crate::analytics::DEFAULT_TOP_ITEMS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workbook: None,
            export_dir: default_export_dir(),
            top_items: default_top_items(),
            log_level: None,
            log_file: None,
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("scango")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                // read before logging is set up
                eprintln!("Ignoring unreadable settings file {}: {e}", path.display());
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ScanGoError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
