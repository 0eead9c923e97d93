//! Autosave scheduling and backup rotation
//!
//! Autosaves land in the app data directory as timestamped JSON files;
//! explicit saves leave a backup copy the same way. Rotation keeps the
//! newest N files per prefix. The timestamp is embedded in the file name,
//! so lexicographic order is chronological.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;
use walkdir::WalkDir;

use super::config::AutosaveConfig;
use super::project::Project;

pub const AUTOSAVE_PREFIX: &str = "autosave_";
pub const BACKUP_PREFIX: &str = "backup_";

/// Tracks when the next autosave is due and what was last written
pub struct AutosaveState {
    last_run: Instant,
    last_hash: u64,
}

impl AutosaveState {
    pub fn new(initial_hash: u64) -> Self {
        Self {
            last_run: Instant::now(),
            last_hash: initial_hash,
        }
    }

    /// Whether the autosave interval has elapsed.
    pub fn due(&self, config: &AutosaveConfig) -> bool {
        config.enabled && self.last_run.elapsed() >= Duration::from_secs(config.interval_secs)
    }

    /// Whether the project changed since the last autosave.
    pub fn changed_since(&self, hash: u64) -> bool {
        hash != self.last_hash
    }

    /// Record a completed (or skipped) autosave cycle.
    pub fn mark(&mut self, hash: u64) {
        self.last_run = Instant::now();
        self.last_hash = hash;
    }

    /// Seconds until the next autosave, for the status bar.
    pub fn seconds_until(&self, config: &AutosaveConfig) -> Option<u64> {
        if !config.enabled {
            return None;
        }
        Some(config.interval_secs.saturating_sub(self.last_run.elapsed().as_secs()))
    }
}

fn timestamped(prefix: &str) -> String {
    format!("{}{}.json", prefix, Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write an autosave file and rotate old ones.
pub fn write_autosave(project: &Project, dir: &Path, keep: usize) -> Result<PathBuf> {
    let path = dir.join(timestamped(AUTOSAVE_PREFIX));
    project.save(&path)?;
    rotate(dir, AUTOSAVE_PREFIX, keep)?;
    Ok(path)
}

/// Write a backup copy and rotate old ones.
pub fn write_backup(project: &Project, dir: &Path, keep: usize) -> Result<PathBuf> {
    let path = dir.join(timestamped(BACKUP_PREFIX));
    project.save(&path)?;
    rotate(dir, BACKUP_PREFIX, keep)?;
    Ok(path)
}

/// Delete the oldest files with the given prefix beyond `keep`.
///
/// Returns how many files were removed.
pub fn rotate(dir: &Path, prefix: &str, keep: usize) -> Result<usize> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name().to_string_lossy().starts_with(prefix)
                && e.path().extension().map(|ext| ext == "json").unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();

    let mut removed = 0;
    while files.len() > keep {
        let oldest = files.remove(0);
        std::fs::remove_file(&oldest)
            .with_context(|| format!("Failed to remove old backup: {}", oldest.display()))?;
        tracing::debug!("Rotated out {}", oldest.display());
        removed += 1;
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("proyecta_autosave_{}_{}", tag, std::process::id()));
        let _ = fs::create_dir_all(&dir);
        dir
    }

    #[test]
    fn test_rotation_keeps_newest() {
        let dir = temp_dir("rotate");
        for day in 1..=12 {
            let name = format!("autosave_202401{:02}_120000.json", day);
            fs::write(dir.join(name), "{}").unwrap();
        }
        fs::write(dir.join("otro.json"), "{}").unwrap();

        let removed = rotate(&dir, AUTOSAVE_PREFIX, 10).unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.join("autosave_20240101_120000.json").exists());
        assert!(!dir.join("autosave_20240102_120000.json").exists());
        assert!(dir.join("autosave_20240103_120000.json").exists());
        assert!(dir.join("autosave_20240112_120000.json").exists());
        assert!(dir.join("otro.json").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_autosave_creates_file() {
        let dir = temp_dir("write");
        let project = Project::new();

        let path = write_autosave(&project, &dir, 10).unwrap();
        assert!(path.exists());
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with(AUTOSAVE_PREFIX));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_state_due_and_change_tracking() {
        let config = AutosaveConfig {
            enabled: true,
            interval_secs: 0,
        };
        let mut state = AutosaveState::new(1);
        assert!(state.due(&config));
        assert!(state.changed_since(2));
        assert!(!state.changed_since(1));

        state.mark(2);
        assert!(!state.changed_since(2));

        let disabled = AutosaveConfig {
            enabled: false,
            interval_secs: 0,
        };
        assert!(!state.due(&disabled));
        assert_eq!(state.seconds_until(&disabled), None);
    }
}
