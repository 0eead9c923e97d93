//! Application configuration management

use std::path::PathBuf;

use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use super::validate::ValidationLevel;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Last opened project file
    pub last_project: Option<PathBuf>,
    /// Recently opened project files
    pub recent_projects: Vec<PathBuf>,
    /// Autosave settings
    pub autosave: AutosaveConfig,
    /// Backup settings
    pub backups: BackupConfig,
    /// Strictness level used by the validation tab
    pub validation_level: ValidationLevel,
    /// UI settings
    pub ui: UiConfig,
}

/// Autosave settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    pub enabled: bool,
    /// Seconds between autosaves
    pub interval_secs: u64,
}

/// Backup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupConfig {
    pub enabled: bool,
    /// Autosave/backup files kept before rotation deletes the oldest
    pub max_backups: usize,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            last_project: None,
            recent_projects: Vec::new(),
            autosave: AutosaveConfig::default(),
            backups: BackupConfig::default(),
            validation_level: ValidationLevel::default(),
            ui: UiConfig::default(),
        }
    }
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_backups: 10,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "proyecta", "Proyecta")
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Add a project file to the recent list
    pub fn add_recent_project(&mut self, path: PathBuf) {
        // Remove if already exists
        self.recent_projects.retain(|p| p != &path);
        // Add to front
        self.recent_projects.insert(0, path);
        // Keep only last 10
        self.recent_projects.truncate(10);
    }

    /// Directory for autosave files
    pub fn autosave_dir(&self) -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_dir().join("autosaves"))
            .unwrap_or_else(|| PathBuf::from("autosaves"))
    }

    /// Directory for backup copies written on every explicit save
    pub fn backup_dir(&self) -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_dir().join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert!(config.autosave.enabled);
        assert_eq!(config.autosave.interval_secs, 300);
        assert_eq!(config.backups.max_backups, 10);
        assert_eq!(config.validation_level, ValidationLevel::Estandar);
        assert_eq!(config.ui.theme, "dark");
    }

    #[test]
    fn test_serde_round_trip() {
        let mut config = AppConfig::default();
        config.validation_level = ValidationLevel::Estricto;
        config.add_recent_project(PathBuf::from("/tmp/uno.json"));

        let json = serde_json::to_string(&config).unwrap();
        let loaded: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.validation_level, ValidationLevel::Estricto);
        assert_eq!(loaded.recent_projects, config.recent_projects);
    }

    #[test]
    fn test_recent_projects_dedup_and_cap() {
        let mut config = AppConfig::default();
        for i in 0..12 {
            config.add_recent_project(PathBuf::from(format!("/tmp/p{}.json", i)));
        }
        assert_eq!(config.recent_projects.len(), 10);
        assert_eq!(config.recent_projects[0], PathBuf::from("/tmp/p11.json"));

        config.add_recent_project(PathBuf::from("/tmp/p5.json"));
        assert_eq!(config.recent_projects.len(), 10);
        assert_eq!(config.recent_projects[0], PathBuf::from("/tmp/p5.json"));
    }
}
