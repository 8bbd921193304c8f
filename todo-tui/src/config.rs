use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_URL_ENV: &str = "TODO_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Base URL of the todo API, e.g. "http://localhost:8080". `/api/...` is appended.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Directory CSV exports are written to.
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Filter for the log file, e.g. "info" or "todo_tui=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            export_dir: default_export_dir(),
            log_level: default_log_level(),
        }
    }
}

pub fn root_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join("todo-tui"))
}

impl TodoConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(root_path()?.join("config.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(root_path()?.join("todo-tui.log"))
    }

    /// Load config from disk, then apply the environment override.
    /// Returns the default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            Self::parse(&raw)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Self::default()
        };
        config.api_url = resolve_api_url(&config.api_url, std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)?;
        Ok(())
    }

    /// Print the config path, writing the defaults first if the file is missing.
    pub fn ensure_exists() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::default().save()?;
        }
        Ok(path)
    }
}

/// A non-empty environment value wins over the configured URL.
pub fn resolve_api_url(configured: &str, env_override: Option<String>) -> String {
    match env_override {
        Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
        _ => configured.trim_end_matches('/').to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = TodoConfig::parse("export_dir = \"/tmp/exports\"").unwrap();

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.export_dir, PathBuf::from("/tmp/exports"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn env_override_wins_when_set() {
        assert_eq!(
            resolve_api_url("http://localhost:8080", Some("https://todo.example.com/".into())),
            "https://todo.example.com"
        );
        assert_eq!(
            resolve_api_url("http://localhost:8080/", Some("  ".into())),
            "http://localhost:8080"
        );
        assert_eq!(resolve_api_url("http://a", None), "http://a");
    }
}
