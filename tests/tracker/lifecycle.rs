use profile_tray::error::DispatchError;
use profile_tray::launcher::{Dispatcher, ProfileAction};
use profile_tray::lifecycle::{MachineStore, StatusProber};
use profile_tray::profiles::DirProfileSource;
use profile_tray::settings::Intervals;
use profile_tray::tracker::Tracker;
use profile_tray::tray::menu::{Indicator, MenuSurface, ProfileClicks};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Keeps the click senders so the test can press menu items.
#[derive(Default)]
struct RecordingSurface {
    clicks: Mutex<HashMap<(String, ProfileAction), mpsc::UnboundedSender<()>>>,
    indicators: Mutex<Vec<(String, Indicator)>>,
    removed: Mutex<Vec<String>>,
}

impl RecordingSurface {
    fn click(&self, profile: &str, action: ProfileAction) {
        let clicks = self.clicks.lock().unwrap();
        clicks[&(profile.to_string(), action)].send(()).unwrap();
    }

    fn last_indicator(&self, profile: &str) -> Option<Indicator> {
        let indicators = self.indicators.lock().unwrap();
        indicators.iter().rev().find(|(name, _)| name == profile).map(|(_, i)| *i)
    }
}

impl MenuSurface for RecordingSurface {
    fn add_profile(&self, profile: &str) -> ProfileClicks {
        let (start_tx, start) = mpsc::unbounded_channel();
        let (stop_tx, stop) = mpsc::unbounded_channel();
        let mut clicks = self.clicks.lock().unwrap();
        clicks.insert((profile.to_string(), ProfileAction::Start), start_tx);
        clicks.insert((profile.to_string(), ProfileAction::Stop), stop_tx);
        ProfileClicks { start, stop }
    }

    fn set_indicator(&self, profile: &str, indicator: Indicator) {
        self.indicators.lock().unwrap().push((profile.to_string(), indicator));
    }

    fn remove_profile(&self, profile: &str) {
        self.removed.lock().unwrap().push(profile.to_string());
    }
}

/// Stands in for the re-executed binary: applies the action to the store directly.
struct StoreDispatcher {
    store: MachineStore,
}

impl Dispatcher for StoreDispatcher {
    fn dispatch(&self, action: ProfileAction, profile: &str) -> Result<(), DispatchError> {
        let result = match action {
            ProfileAction::Start => self.store.mark_running(profile),
            ProfileAction::Stop => self.store.mark_stopped(profile),
        };
        result.map_err(|e| DispatchError::Failed { program: e.to_string(), code: Some(1) })
    }
}

struct Setup {
    _temp: TempDir,
    root: PathBuf,
    tracker: Arc<Tracker>,
    surface: Arc<RecordingSurface>,
}

fn setup(intervals: Intervals) -> Setup {
    let temp = TempDir::new().unwrap();
    let root = temp.path().join("profiles");
    std::fs::create_dir_all(&root).unwrap();

    let surface = Arc::new(RecordingSurface::default());
    let tracker = Tracker::new(
        Arc::new(DirProfileSource::new(root.clone())),
        StatusProber::new(Arc::new(MachineStore::new(root.clone()))),
        Arc::new(StoreDispatcher { store: MachineStore::new(root.clone()) }),
        surface.clone(),
        intervals,
    );

    Setup { _temp: temp, root, tracker, surface }
}

fn fast_intervals() -> Intervals {
    Intervals {
        add: Duration::from_millis(20),
        remove: Duration::from_millis(20),
        status: Duration::from_millis(10),
    }
}

async fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    while !cond() {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn refresh_reflects_machine_state_on_disk() {
    // Arrange
    let s = setup(Intervals::default());
    MachineStore::new(s.root.clone()).mark_running("dev").unwrap();
    std::fs::create_dir(s.root.join("fresh")).unwrap();
    s.tracker.initialize().await;

    // Act
    let changed = s.tracker.refresh_statuses().await;

    // Assert
    assert_eq!(changed, 2);
    assert_eq!(s.tracker.indicator("dev"), Some(Indicator::Running));
    assert_eq!(s.tracker.indicator("fresh"), Some(Indicator::DoesNotExist));
}

#[tokio::test]
async fn deleted_profile_directory_is_removed_from_menu() {
    // Arrange
    let s = setup(Intervals::default());
    MachineStore::new(s.root.clone()).mark_running("dev").unwrap();
    s.tracker.initialize().await;
    assert!(s.tracker.is_tracked("dev"));

    // Act
    std::fs::remove_dir_all(s.root.join("dev")).unwrap();
    let removed = s.tracker.reconcile_removed().await.unwrap();

    // Assert
    assert_eq!(removed, 1);
    assert!(!s.tracker.is_tracked("dev"));
    assert_eq!(*s.surface.removed.lock().unwrap(), vec!["dev".to_string()]);
}

#[tokio::test]
async fn start_and_stop_clicks_drive_the_indicator() {
    // Arrange
    let s = setup(Intervals::default());
    std::fs::create_dir(s.root.join("dev")).unwrap();
    s.tracker.initialize().await;

    // Act
    s.surface.click("dev", ProfileAction::Start);
    wait_for(|| s.tracker.indicator("dev") == Some(Indicator::Running)).await;
    s.surface.click("dev", ProfileAction::Stop);
    wait_for(|| s.tracker.indicator("dev") == Some(Indicator::Stopped)).await;

    // Assert
    assert_eq!(s.tracker.refresh_statuses().await, 0);
    assert_eq!(s.surface.last_indicator("dev"), Some(Indicator::Stopped));
    s.tracker.shutdown();
}

#[tokio::test]
async fn running_tracker_follows_profile_directory() {
    // Arrange
    let s = setup(fast_intervals());
    let run = tokio::spawn(Arc::clone(&s.tracker).run());

    // Act
    MachineStore::new(s.root.clone()).mark_running("dev").unwrap();
    wait_for(|| s.tracker.indicator("dev") == Some(Indicator::Running)).await;

    MachineStore::new(s.root.clone()).mark_stopped("dev").unwrap();
    wait_for(|| s.tracker.indicator("dev") == Some(Indicator::Stopped)).await;

    std::fs::remove_dir_all(s.root.join("dev")).unwrap();
    wait_for(|| !s.tracker.is_tracked("dev")).await;

    // Assert
    s.tracker.shutdown();
    tokio::time::timeout(Duration::from_secs(2), run).await.unwrap().unwrap();
    assert!(s.tracker.tracked_profiles().is_empty());
}
