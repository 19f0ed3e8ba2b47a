//! Profile tracking for the tray menu.
//!
//! `Tracker` owns the map from profile name to [`MenuEntry`]. Three periodic
//! loops share it: one adds newly listed profiles, one drops profiles that
//! disappeared, and one refreshes the status indicators. Each entry also owns
//! two dispatch loops (Start and Stop) that live under the entry's
//! cancellation token, so removing an entry stops its listeners.
//!
//! The map lock is only held for map reads and writes; profile listing,
//! status probes and process launches run without it.

mod dispatch;
mod reconcile;
mod status;

#[cfg(test)]
mod fakes;

use crate::launcher::{Dispatcher, ProfileAction};
use crate::lifecycle::StatusProber;
use crate::profiles::ProfileSource;
use crate::settings::Intervals;
use crate::tray::menu::{Indicator, MenuSurface, ProfileClicks};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct MenuEntry {
    indicator: Option<Indicator>,
    cancel: CancellationToken,
}

impl MenuEntry {
    pub fn indicator(&self) -> Option<Indicator> {
        self.indicator
    }
}

/// An entry registered under the lock whose dispatch loops still need spawning.
struct PendingEntry {
    profile: String,
    clicks: ProfileClicks,
    cancel: CancellationToken,
}

pub struct Tracker {
    entries: Mutex<HashMap<String, MenuEntry>>,
    source: Arc<dyn ProfileSource>,
    prober: StatusProber,
    dispatcher: Arc<dyn Dispatcher>,
    surface: Arc<dyn MenuSurface>,
    intervals: Intervals,
    shutdown: CancellationToken,
}

impl Tracker {
    pub fn new(
        source: Arc<dyn ProfileSource>,
        prober: StatusProber,
        dispatcher: Arc<dyn Dispatcher>,
        surface: Arc<dyn MenuSurface>,
        intervals: Intervals,
    ) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            source,
            prober,
            dispatcher,
            surface,
            intervals,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Tracked profile names, sorted.
    pub fn tracked_profiles(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_tracked(&self, profile: &str) -> bool {
        self.lock().contains_key(profile)
    }

    pub fn indicator(&self, profile: &str) -> Option<Indicator> {
        self.lock().get(profile).and_then(MenuEntry::indicator)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, MenuEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds the initial menu from the current listing.
    pub async fn initialize(self: &Arc<Self>) -> usize {
        match self.reconcile_added().await {
            Ok(added) => {
                log::info!("Tracking {} profile(s)", added);
                added
            }
            Err(e) => {
                log::warn!("Initial profile listing failed: {:#}", e);
                0
            }
        }
    }

    /// Initializes, then runs the periodic loops until shutdown.
    pub async fn run(self: Arc<Self>) {
        self.initialize().await;
        let handles = self.spawn_loops();

        self.shutdown.cancelled().await;
        for handle in handles {
            if let Err(e) = handle.await {
                log::error!("Tracker loop panicked: {}", e);
            }
        }
        log::info!("Profile tracker stopped");
    }

    pub fn spawn_loops(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let add = {
            let tracker = Arc::clone(self);
            tokio::spawn(every(self.intervals.add, self.shutdown.clone(), move || {
                let tracker = Arc::clone(&tracker);
                async move {
                    if let Err(e) = tracker.reconcile_added().await {
                        log::warn!("Adding new profiles failed: {:#}", e);
                    }
                }
            }))
        };

        let remove = {
            let tracker = Arc::clone(self);
            tokio::spawn(every(self.intervals.remove, self.shutdown.clone(), move || {
                let tracker = Arc::clone(&tracker);
                async move {
                    if let Err(e) = tracker.reconcile_removed().await {
                        log::warn!("Removing deleted profiles failed: {:#}", e);
                    }
                }
            }))
        };

        let status = {
            let tracker = Arc::clone(self);
            tokio::spawn(every(self.intervals.status, self.shutdown.clone(), move || {
                let tracker = Arc::clone(&tracker);
                async move {
                    tracker.refresh_statuses().await;
                }
            }))
        };

        vec![add, remove, status]
    }

    async fn list_profiles(&self) -> Result<Vec<String>> {
        let source = Arc::clone(&self.source);
        tokio::task::spawn_blocking(move || source.list_profiles())
            .await
            .context("Profile listing task failed")?
    }

    /// Sets the indicator unless the entry is gone or `owner` has been cancelled.
    /// Returns whether the indicator changed.
    fn apply_indicator(&self, profile: &str, indicator: Indicator, owner: Option<&CancellationToken>) -> bool {
        if owner.is_some_and(CancellationToken::is_cancelled) {
            return false;
        }

        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(profile) else { return false };
        if entry.cancel.is_cancelled() || entry.indicator == Some(indicator) {
            return false;
        }

        entry.indicator = Some(indicator);
        // Sent under the lock so surface updates keep the map's order; the send never blocks.
        self.surface.set_indicator(profile, indicator);
        true
    }

    fn spawn_dispatch_loops(self: &Arc<Self>, pending: PendingEntry) {
        let PendingEntry { profile, clicks, cancel } = pending;
        let ProfileClicks { start, stop } = clicks;

        for (action, receiver) in [(ProfileAction::Start, start), (ProfileAction::Stop, stop)] {
            tokio::spawn(dispatch::dispatch_loop(
                Arc::clone(self),
                profile.clone(),
                action,
                receiver,
                cancel.clone(),
            ));
        }
    }
}

/// Calls `tick` every `period`, first after one full period, until `cancel` fires.
async fn every<F, Fut>(period: Duration, cancel: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => tick().await,
        }
    }
}
