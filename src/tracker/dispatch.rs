use super::Tracker;
use crate::launcher::ProfileAction;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Waits for clicks on one (profile, action) menu item and launches the action.
/// Ends when `cancel` fires or the click channel closes.
pub(super) async fn dispatch_loop(
    tracker: Arc<Tracker>,
    profile: String,
    action: ProfileAction,
    mut clicks: mpsc::UnboundedReceiver<()>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            click = clicks.recv() => {
                if click.is_none() {
                    break;
                }
                tracker.handle_click(&profile, action, &cancel).await;
            }
        }
    }
    log::debug!("Dispatch loop for {} ({}) finished", profile, action);
}

impl Tracker {
    async fn handle_click(&self, profile: &str, action: ProfileAction, cancel: &CancellationToken) {
        let dispatcher = Arc::clone(&self.dispatcher);
        let name = profile.to_string();
        let result = tokio::task::spawn_blocking(move || dispatcher.dispatch(action, &name)).await;

        match result {
            Ok(Ok(())) => {
                self.apply_indicator(profile, action.indicator(), Some(cancel));
            }
            Ok(Err(e)) => log::error!("Failed to {} profile {}: {}", action, profile, e),
            Err(e) => log::error!("Dispatch task for {} panicked: {}", profile, e),
        }
    }
}
