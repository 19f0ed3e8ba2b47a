use crate::paths;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds between passes that add newly created profiles to the tray.
    #[serde(default = "default_add_interval")]
    pub add_interval_secs: u64,
    /// Seconds between passes that drop deleted profiles from the tray.
    #[serde(default = "default_remove_interval")]
    pub remove_interval_secs: u64,
    /// Seconds between status indicator refreshes.
    #[serde(default = "default_status_interval")]
    pub status_interval_secs: u64,
    #[serde(default)]
    pub profiles_dir: Option<PathBuf>,
}

fn default_add_interval() -> u64 {
    40
}

fn default_remove_interval() -> u64 {
    30
}

fn default_status_interval() -> u64 {
    20
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            add_interval_secs: default_add_interval(),
            remove_interval_secs: default_remove_interval(),
            status_interval_secs: default_status_interval(),
            profiles_dir: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Settings = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings in {:?}", path))?;
        Ok(settings)
    }

    pub fn profiles_dir(&self) -> Result<PathBuf> {
        match &self.profiles_dir {
            Some(dir) => Ok(dir.clone()),
            None => paths::default_profiles_dir(),
        }
    }

    pub fn intervals(&self) -> Intervals {
        Intervals {
            add: Duration::from_secs(self.add_interval_secs.max(1)),
            remove: Duration::from_secs(self.remove_interval_secs.max(1)),
            status: Duration::from_secs(self.status_interval_secs.max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    pub add: Duration,
    pub remove: Duration,
    pub status: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Settings::default().intervals()
    }
}
