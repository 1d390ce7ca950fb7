use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FinanceError, Result};
use crate::models::Platform;
use crate::tracker::{MonthBasis, TrackerConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir_string")]
    pub data_dir: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_wise_files")]
    pub wise_files: Vec<String>,
    #[serde(default = "default_revolut_files")]
    pub revolut_files: Vec<String>,
    #[serde(default = "default_categories_file")]
    pub categories_file: String,
    #[serde(default = "default_monthly_dir")]
    pub monthly_dir: String,
    #[serde(default)]
    pub month_basis: MonthBasis,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir_string() -> String {
    default_data_dir().to_string_lossy().to_string()
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_wise_files() -> Vec<String> {
    vec!["wise.csv".to_string()]
}

fn default_revolut_files() -> Vec<String> {
    vec!["revolut.csv".to_string()]
}

fn default_categories_file() -> String {
    "categories.json".to_string()
}

fn default_monthly_dir() -> String {
    "monthly_data".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir_string(),
            base_currency: default_base_currency(),
            wise_files: default_wise_files(),
            revolut_files: default_revolut_files(),
            categories_file: default_categories_file(),
            monthly_dir: default_monthly_dir(),
            month_basis: MonthBasis::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand_path(&self.data_dir))
    }

    /// Relative names resolve against `data_dir`; absolute paths are kept.
    pub fn resolve(&self, name: &str) -> PathBuf {
        let path = PathBuf::from(shellexpand_path(name));
        if path.is_absolute() {
            path
        } else {
            self.data_dir().join(path)
        }
    }

    pub fn sources(&self) -> Vec<(Platform, PathBuf)> {
        let wise = self.wise_files.iter().map(|f| (Platform::Wise, self.resolve(f)));
        let revolut = self.revolut_files.iter().map(|f| (Platform::Revolut, self.resolve(f)));
        wise.chain(revolut).collect()
    }

    pub fn categories_path(&self) -> PathBuf {
        self.resolve(&self.categories_file)
    }

    pub fn monthly_path(&self) -> PathBuf {
        self.resolve(&self.monthly_dir)
    }

    pub fn tracker_config(&self) -> Result<TrackerConfig> {
        let base_currency = self.base_currency.trim().to_uppercase();
        if base_currency.is_empty() {
            return Err(FinanceError::Settings("base_currency cannot be empty".to_string()));
        }
        Ok(TrackerConfig {
            sources: self.sources(),
            categories_path: self.categories_path(),
            base_currency,
            month_basis: self.month_basis,
        })
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("fintrack")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("fintrack")
}

/// Read settings from `path` (or the default location). A missing or
/// malformed file falls back to defaults.
pub fn load_settings(path: Option<&Path>) -> Settings {
    let path = path.map_or_else(settings_path, Path::to_path_buf);
    if !path.exists() {
        return Settings::default();
    }
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    match serde_json::from_str(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring malformed settings at {}: {e}", path.display());
            Settings::default()
        }
    }
}

pub fn save_settings(settings: &Settings, path: Option<&Path>) -> Result<()> {
    let path = path.map_or_else(settings_path, Path::to_path_buf);
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| FinanceError::Settings(e.to_string()))?;
    std::fs::write(&path, format!("{json}\n"))?;
    Ok(())
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let settings = Settings {
            data_dir: "/tmp/books".to_string(),
            base_currency: "GBP".to_string(),
            wise_files: vec!["w1.csv".into(), "w2.csv".into()],
            month_basis: MonthBasis::Started,
            ..Settings::default()
        };
        save_settings(&settings, Some(&path)).unwrap();
        let loaded = load_settings(Some(&path));
        assert_eq!(loaded.data_dir, "/tmp/books");
        assert_eq!(loaded.base_currency, "GBP");
        assert_eq!(loaded.wise_files.len(), 2);
        assert_eq!(loaded.month_basis, MonthBasis::Started);
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"month_basis\": \"started\""));
    }

    #[test]
    fn test_load_merges_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"data_dir": "/tmp/books", "base_currency": "USD"}"#).unwrap();
        let s = load_settings(Some(&path));
        assert_eq!(s.base_currency, "USD");
        assert_eq!(s.revolut_files, vec!["revolut.csv"]);
        assert_eq!(s.month_basis, MonthBasis::Completed);
        assert_eq!(s.log_level, "info");
    }

    #[test]
    fn test_malformed_or_missing_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(load_settings(Some(&path)).base_currency, "EUR");
        std::fs::write(&path, "{oops").unwrap();
        assert_eq!(load_settings(Some(&path)).categories_file, "categories.json");
    }

    #[test]
    fn test_resolve_against_data_dir() {
        let s = Settings {
            data_dir: "/data".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.resolve("wise.csv"), PathBuf::from("/data/wise.csv"));
        assert_eq!(s.resolve("/abs/rev.csv"), PathBuf::from("/abs/rev.csv"));
        let sources = s.sources();
        assert_eq!(sources[0], (Platform::Wise, PathBuf::from("/data/wise.csv")));
        assert_eq!(sources[1].0, Platform::Revolut);
    }

    #[test]
    fn test_tracker_config_normalizes_currency() {
        let s = Settings {
            base_currency: " usd ".to_string(),
            ..Settings::default()
        };
        assert_eq!(s.tracker_config().unwrap().base_currency, "USD");
        let bad = Settings {
            base_currency: "  ".to_string(),
            ..Settings::default()
        };
        assert!(matches!(bad.tracker_config(), Err(FinanceError::Settings(_))));
    }
}
