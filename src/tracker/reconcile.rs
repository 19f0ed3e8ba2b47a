use super::{MenuEntry, PendingEntry, Tracker};
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;

impl Tracker {
    /// Adds an entry for every listed profile that is not tracked yet.
    /// Returns how many entries were created.
    pub async fn reconcile_added(self: &Arc<Self>) -> Result<usize> {
        let listed = self.list_profiles().await?;

        let pending: Vec<PendingEntry> = {
            let mut entries = self.lock();
            let mut pending = Vec::new();
            for profile in listed {
                if entries.contains_key(&profile) {
                    continue;
                }

                let cancel = self.shutdown.child_token();
                let clicks = self.surface.add_profile(&profile);
                entries.insert(profile.clone(), MenuEntry { indicator: None, cancel: cancel.clone() });
                pending.push(PendingEntry { profile, clicks, cancel });
            }
            pending
        };

        let added = pending.len();
        for entry in pending {
            log::info!("Added profile {} to the tray", entry.profile);
            self.spawn_dispatch_loops(entry);
        }
        Ok(added)
    }

    /// Drops every tracked entry missing from the current listing, cancelling
    /// its dispatch loops first. Returns how many entries were removed.
    pub async fn reconcile_removed(&self) -> Result<usize> {
        let listed: HashSet<String> = self.list_profiles().await?.into_iter().collect();

        let removed: Vec<String> = {
            let mut entries = self.lock();
            let stale: Vec<String> = entries.keys().filter(|name| !listed.contains(*name)).cloned().collect();
            for name in &stale {
                if let Some(entry) = entries.remove(name) {
                    entry.cancel.cancel();
                }
                // Under the lock, so a concurrent re-add of the same name lands after this removal.
                self.surface.remove_profile(name);
            }
            stale
        };

        for name in &removed {
            log::info!("Removed profile {} from the tray", name);
        }
        Ok(removed.len())
    }
}
