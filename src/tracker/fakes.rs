use super::Tracker;
use crate::error::{DispatchError, LifecycleError};
use crate::launcher::{Dispatcher, ProfileAction};
use crate::lifecycle::{LifecycleClient, LifecycleManager, StatusProber};
use crate::profiles::ProfileSource;
use crate::settings::Intervals;
use crate::tray::menu::{Indicator, MenuSurface, ProfileClicks};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct FakeSource {
    profiles: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl FakeSource {
    pub fn set(&self, profiles: &[&str]) {
        *self.profiles.lock().unwrap() = profiles.iter().map(|p| p.to_string()).collect();
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl ProfileSource for FakeSource {
    fn list_profiles(&self) -> anyhow::Result<Vec<String>> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("profile store unavailable");
        }
        let mut profiles = self.profiles.lock().unwrap().clone();
        profiles.sort();
        Ok(profiles)
    }
}

#[derive(Default)]
pub struct FakeManager {
    statuses: Mutex<HashMap<String, String>>,
    opened: AtomicUsize,
    open_clients: Arc<AtomicUsize>,
}

impl FakeManager {
    pub fn set_status(&self, profile: &str, status: &str) {
        self.statuses.lock().unwrap().insert(profile.to_string(), status.to_string());
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn open_clients(&self) -> usize {
        self.open_clients.load(Ordering::SeqCst)
    }
}

struct FakeClient<'a> {
    manager: &'a FakeManager,
}

impl LifecycleManager for FakeManager {
    fn open(&self) -> Result<Box<dyn LifecycleClient + '_>, LifecycleError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.open_clients.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeClient { manager: self }))
    }
}

impl LifecycleClient for FakeClient<'_> {
    fn status(&self, profile: &str) -> Result<String, LifecycleError> {
        self.manager
            .statuses
            .lock()
            .unwrap()
            .get(profile)
            .cloned()
            .ok_or_else(|| LifecycleError::NotFound(profile.to_string()))
    }
}

impl Drop for FakeClient<'_> {
    fn drop(&mut self) {
        self.manager.open_clients.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeDispatcher {
    calls: Mutex<Vec<(ProfileAction, String)>>,
    fail: AtomicBool,
}

impl FakeDispatcher {
    pub fn calls(&self) -> Vec<(ProfileAction, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl Dispatcher for FakeDispatcher {
    fn dispatch(&self, action: ProfileAction, profile: &str) -> Result<(), DispatchError> {
        self.calls.lock().unwrap().push((action, profile.to_string()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(DispatchError::ShellNotFound("cmd.exe".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct SurfaceState {
    added: Vec<String>,
    removed: Vec<String>,
    indicators: HashMap<String, Vec<Indicator>>,
    clicks: HashMap<(String, ProfileAction), mpsc::UnboundedSender<()>>,
}

#[derive(Default)]
pub struct FakeSurface {
    state: Mutex<SurfaceState>,
}

impl FakeSurface {
    pub fn added(&self) -> Vec<String> {
        self.state.lock().unwrap().added.clone()
    }

    pub fn removed(&self) -> Vec<String> {
        self.state.lock().unwrap().removed.clone()
    }

    pub fn indicators(&self, profile: &str) -> Vec<Indicator> {
        self.state.lock().unwrap().indicators.get(profile).cloned().unwrap_or_default()
    }

    /// Simulates a menu click; false when no live loop is listening.
    pub fn click(&self, profile: &str, action: ProfileAction) -> bool {
        let state = self.state.lock().unwrap();
        state
            .clicks
            .get(&(profile.to_string(), action))
            .is_some_and(|tx| tx.send(()).is_ok())
    }

    pub fn click_closed(&self, profile: &str, action: ProfileAction) -> bool {
        let state = self.state.lock().unwrap();
        state.clicks.get(&(profile.to_string(), action)).map_or(true, |tx| tx.is_closed())
    }
}

impl MenuSurface for FakeSurface {
    fn add_profile(&self, profile: &str) -> ProfileClicks {
        let (start_tx, start) = mpsc::unbounded_channel();
        let (stop_tx, stop) = mpsc::unbounded_channel();
        let mut state = self.state.lock().unwrap();
        state.added.push(profile.to_string());
        state.clicks.insert((profile.to_string(), ProfileAction::Start), start_tx);
        state.clicks.insert((profile.to_string(), ProfileAction::Stop), stop_tx);
        ProfileClicks { start, stop }
    }

    fn set_indicator(&self, profile: &str, indicator: Indicator) {
        let mut state = self.state.lock().unwrap();
        state.indicators.entry(profile.to_string()).or_default().push(indicator);
    }

    fn remove_profile(&self, profile: &str) {
        self.state.lock().unwrap().removed.push(profile.to_string());
    }
}

pub struct Harness {
    pub tracker: Arc<Tracker>,
    pub source: Arc<FakeSource>,
    pub manager: Arc<FakeManager>,
    pub dispatcher: Arc<FakeDispatcher>,
    pub surface: Arc<FakeSurface>,
}

impl Harness {
    pub fn prober(&self) -> StatusProber {
        StatusProber::new(self.manager.clone())
    }

    pub async fn wait_for(&self, mut condition: impl FnMut() -> bool) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while !condition() {
            assert!(tokio::time::Instant::now() < deadline, "condition not reached within 2s");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

pub struct HarnessBuilder {
    source: FakeSource,
    manager: FakeManager,
    intervals: Intervals,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            source: FakeSource::default(),
            manager: FakeManager::default(),
            intervals: Intervals::default(),
        }
    }

    pub fn profiles(self, profiles: &[&str]) -> Self {
        self.source.set(profiles);
        self
    }

    pub fn status(self, profile: &str, status: &str) -> Self {
        self.manager.set_status(profile, status);
        self
    }

    pub fn intervals(mut self, intervals: Intervals) -> Self {
        self.intervals = intervals;
        self
    }

    pub fn build(self) -> Harness {
        let source = Arc::new(self.source);
        let manager = Arc::new(self.manager);
        let dispatcher = Arc::new(FakeDispatcher::default());
        let surface = Arc::new(FakeSurface::default());

        let tracker = Tracker::new(
            source.clone(),
            StatusProber::new(manager.clone()),
            dispatcher.clone(),
            surface.clone(),
            self.intervals,
        );

        Harness { tracker, source, manager, dispatcher, surface }
    }
}
