//! Push settings
//!
//! Holds the background-sync policy that governs global push suppression.
//! Settings can be loaded from a TOML file, updated at runtime, and observed
//! as a change stream by the push controller.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};
use tracing::info;

use crate::signals::settings::SettingsStore;
use crate::types::error::{PushError, Result};

/// Process-wide settings manager instance
static MANAGER: OnceCell<Arc<SettingsManager>> = OnceCell::new();

/// User-facing background-sync policy.
///
/// `FollowSystemAutoSync` defers to the platform's global auto-sync switch;
/// `Never` suppresses all background activity regardless of per-folder
/// settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSync {
    Always,
    FollowSystemAutoSync,
    Never,
}

impl Default for BackgroundSync {
    fn default() -> Self {
        BackgroundSync::FollowSystemAutoSync
    }
}

/// Settings relevant to the push subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushSettings {
    /// Background-sync policy
    #[serde(default)]
    pub background_sync: BackgroundSync,
}

/// Owns the current [`PushSettings`] and notifies subscribers when the
/// background-sync policy changes.
pub struct SettingsManager {
    settings: RwLock<PushSettings>,
    subscribers: Mutex<Vec<flume::Sender<BackgroundSync>>>,
}

impl SettingsManager {
    pub fn new(settings: PushSettings) -> Self {
        Self {
            settings: RwLock::new(settings),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Get the process-wide settings manager, creating it with defaults on
    /// first use.
    pub fn global() -> Arc<SettingsManager> {
        MANAGER
            .get_or_init(|| Arc::new(SettingsManager::new(PushSettings::default())))
            .clone()
    }

    /// Load settings from the first existing default path, keeping defaults
    /// if no file is found.
    pub fn load(&self) -> Result<()> {
        for path in default_settings_paths() {
            if path.exists() {
                info!("Found push settings at: {:?}", path);
                return self.load_from_path(&path);
            }
        }

        info!("No push settings file found, using defaults");
        Ok(())
    }

    /// Load settings from a specific TOML file.
    pub fn load_from_path(&self, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PushError::Config(format!("Failed to read settings: {}", e)))?;

        let settings: PushSettings = toml::from_str(&content)?;
        self.replace(settings);
        Ok(())
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> PushSettings {
        self.settings.read().unwrap().clone()
    }

    /// Replace all settings, notifying subscribers if the policy changed.
    pub fn replace(&self, settings: PushSettings) {
        let policy = settings.background_sync;
        let changed = {
            let mut guard = self.settings.write().unwrap();
            let changed = guard.background_sync != policy;
            *guard = settings;
            changed
        };
        if changed {
            self.notify(policy);
        }
    }

    /// Update the background-sync policy.
    pub fn set_background_sync(&self, policy: BackgroundSync) {
        let changed = {
            let mut guard = self.settings.write().unwrap();
            let changed = guard.background_sync != policy;
            guard.background_sync = policy;
            changed
        };
        if changed {
            info!("Background-sync policy changed to: {:?}", policy);
            self.notify(policy);
        }
    }

    fn notify(&self, policy: BackgroundSync) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(policy).is_ok());
    }
}

impl SettingsStore for SettingsManager {
    fn background_sync(&self) -> BackgroundSync {
        self.settings.read().unwrap().background_sync
    }

    fn subscribe(&self) -> flume::Receiver<BackgroundSync> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }
}

/// Default settings file locations, most specific first.
pub fn default_settings_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mail-push").join("settings.toml"));
    }

    if let Some(home_dir) = dirs::home_dir() {
        paths.push(
            home_dir
                .join(".config")
                .join("mail-push")
                .join("settings.toml"),
        );
    }

    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let manager = SettingsManager::new(PushSettings::default());
        assert_eq!(
            manager.settings().background_sync,
            BackgroundSync::FollowSystemAutoSync
        );
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "background_sync = \"never\"").unwrap();

        let manager = SettingsManager::new(PushSettings::default());
        manager.load_from_path(file.path()).unwrap();

        assert_eq!(manager.background_sync(), BackgroundSync::Never);
    }

    #[test]
    fn test_load_rejects_invalid_policy() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "background_sync = \"sometimes\"").unwrap();

        let manager = SettingsManager::new(PushSettings::default());
        let result = manager.load_from_path(file.path());

        assert!(matches!(result, Err(PushError::Config(_))));
    }

    #[test]
    fn test_subscribers_see_policy_changes() {
        let manager = SettingsManager::new(PushSettings::default());
        let rx = manager.subscribe();

        manager.set_background_sync(BackgroundSync::Never);
        assert_eq!(rx.try_recv().unwrap(), BackgroundSync::Never);

        // Setting the same policy again is not a change
        manager.set_background_sync(BackgroundSync::Never);
        assert!(rx.try_recv().is_err());

        manager.set_background_sync(BackgroundSync::Always);
        assert_eq!(rx.try_recv().unwrap(), BackgroundSync::Always);
    }
}
