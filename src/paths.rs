use anyhow::{Context, Result};
use std::path::PathBuf;

pub const HOME_ENV: &str = "PROFILE_TRAY_HOME";

pub fn is_safe_path_component(s: &str) -> bool {
    !s.is_empty()
        && !s.contains('/')
        && !s.contains('\\')
        && !s.contains('\0')
        && s != ".."
        && s != "."
}

pub fn config_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(home));
    }
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("profile-tray"))
}

pub fn settings_path() -> Result<PathBuf> {
    config_dir().map(|p| p.join("settings.json"))
}

pub fn default_profiles_dir() -> Result<PathBuf> {
    config_dir().map(|p| p.join("profiles"))
}

pub fn current_executable() -> Result<PathBuf> {
    std::env::current_exe().context("Could not determine current executable")
}
