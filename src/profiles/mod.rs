use crate::paths;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Lists the profile names currently known to the persisted store.
pub trait ProfileSource: Send + Sync {
    fn list_profiles(&self) -> Result<Vec<String>>;
}

/// Profiles are the directories directly under the profiles root.
pub struct DirProfileSource {
    root: PathBuf,
}

impl DirProfileSource {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn ensure_root(&self) -> Result<()> {
        if self.root.exists() { return Ok(()); }

        fs::create_dir_all(&self.root).context("Failed to create profiles directory")?;
        log::info!("Created profiles directory: {:?}", self.root);
        Ok(())
    }
}

impl ProfileSource for DirProfileSource {
    fn list_profiles(&self) -> Result<Vec<String>> {
        list_from_dir(&self.root)
    }
}

pub fn list_from_dir(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        log::debug!("Profiles directory does not exist: {:?}", dir);
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).context("Failed to read profiles directory")?;
    let mut names: Vec<String> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .filter(|name| paths::is_safe_path_component(name))
        .collect();

    names.sort();
    Ok(names)
}
