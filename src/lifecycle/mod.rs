mod store;

pub use store::{MachineClient, MachineState, MachineStore};

use crate::error::LifecycleError;
use crate::tray::menu::Indicator;
use std::sync::Arc;

pub const RUNNING: &str = "Running";
pub const STOPPED: &str = "Stopped";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileStatus {
    Running,
    Stopped,
    DoesNotExist,
    Unknown,
}

impl ProfileStatus {
    pub fn from_status_str(status: &str) -> Self {
        match status {
            RUNNING => ProfileStatus::Running,
            STOPPED => ProfileStatus::Stopped,
            _ => ProfileStatus::Unknown,
        }
    }

    /// `None` leaves the current indicator untouched.
    pub fn indicator(self) -> Option<Indicator> {
        match self {
            ProfileStatus::Running => Some(Indicator::Running),
            ProfileStatus::Stopped => Some(Indicator::Stopped),
            ProfileStatus::DoesNotExist => Some(Indicator::DoesNotExist),
            ProfileStatus::Unknown => None,
        }
    }
}

impl std::fmt::Display for ProfileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProfileStatus::Running => RUNNING,
            ProfileStatus::Stopped => STOPPED,
            ProfileStatus::DoesNotExist => "Does Not Exist",
            ProfileStatus::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Entry point into the VM lifecycle layer.
///
/// A client is opened for every query and released when dropped, so no
/// handle outlives a single probe.
pub trait LifecycleManager: Send + Sync {
    fn open(&self) -> Result<Box<dyn LifecycleClient + '_>, LifecycleError>;
}

pub trait LifecycleClient {
    fn status(&self, profile: &str) -> Result<String, LifecycleError>;
}

#[derive(Clone)]
pub struct StatusProber {
    manager: Arc<dyn LifecycleManager>,
}

impl StatusProber {
    pub fn new(manager: Arc<dyn LifecycleManager>) -> Self {
        Self { manager }
    }

    /// Any failure, including opening the client, reads as `DoesNotExist`.
    pub fn probe(&self, profile: &str) -> ProfileStatus {
        let client = match self.manager.open() {
            Ok(client) => client,
            Err(e) => {
                log::debug!("Could not open lifecycle client for {}: {}", profile, e);
                return ProfileStatus::DoesNotExist;
            }
        };

        match client.status(profile) {
            Ok(status) => {
                let parsed = ProfileStatus::from_status_str(&status);
                log::debug!("Status of {}: {} ({})", profile, status, parsed);
                parsed
            }
            Err(e) => {
                log::debug!("Status query for {} failed: {}", profile, e);
                ProfileStatus::DoesNotExist
            }
        }
    }
}
