use super::{LifecycleClient, LifecycleManager, RUNNING, STOPPED};
use crate::error::LifecycleError;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const MACHINE_FILE: &str = "machine.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineState {
    pub state: String,
}

/// File-backed machine store: `<root>/<profile>/machine.json`.
#[derive(Debug, Clone)]
pub struct MachineStore {
    root: PathBuf,
}

impl MachineStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn profile_dir(&self, profile: &str) -> Result<PathBuf, LifecycleError> {
        if !paths::is_safe_path_component(profile) {
            return Err(LifecycleError::InvalidName(profile.to_string()));
        }
        Ok(self.root.join(profile))
    }

    pub fn mark_running(&self, profile: &str) -> Result<(), LifecycleError> {
        let dir = self.profile_dir(profile)?;
        std::fs::create_dir_all(&dir)?;
        write_state(&dir, RUNNING)?;
        log::info!("Profile {} is now {}", profile, RUNNING);
        Ok(())
    }

    pub fn mark_stopped(&self, profile: &str) -> Result<(), LifecycleError> {
        let dir = self.profile_dir(profile)?;
        if !dir.is_dir() {
            return Err(LifecycleError::NotFound(profile.to_string()));
        }
        write_state(&dir, STOPPED)?;
        log::info!("Profile {} is now {}", profile, STOPPED);
        Ok(())
    }
}

fn write_state(dir: &Path, state: &str) -> Result<(), LifecycleError> {
    let content = serde_json::to_string_pretty(&MachineState { state: state.to_string() })?;
    std::fs::write(dir.join(MACHINE_FILE), content)?;
    Ok(())
}

impl LifecycleManager for MachineStore {
    fn open(&self) -> Result<Box<dyn LifecycleClient + '_>, LifecycleError> {
        if !self.root.is_dir() {
            return Err(LifecycleError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("machine store missing at {:?}", self.root),
            )));
        }
        Ok(Box::new(MachineClient { store: self }))
    }
}

pub struct MachineClient<'a> {
    store: &'a MachineStore,
}

impl LifecycleClient for MachineClient<'_> {
    fn status(&self, profile: &str) -> Result<String, LifecycleError> {
        let path = self.store.profile_dir(profile)?.join(MACHINE_FILE);
        if !path.exists() {
            return Err(LifecycleError::NotFound(profile.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let machine: MachineState = serde_json::from_str(&content)?;
        Ok(machine.state)
    }
}

impl Drop for MachineClient<'_> {
    fn drop(&mut self) {
        log::trace!("Released machine client for {:?}", self.store.root);
    }
}
