#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod polling;

use super::TrayUi;
use crate::menu::builder::ProfileMenus;
use crate::menu::router::HandlerResult;
use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tray_icon::menu::MenuEvent;
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

const TOOLTIP: &str = "Profile Tray";
const POLL_INTERVAL: std::time::Duration = std::time::Duration::from_millis(100);

/// Blocks the calling (main) thread until Exit is clicked or `shutdown` is cancelled.
pub fn run_event_loop(ui: TrayUi, shutdown: CancellationToken) -> Result<()> {
    #[cfg(target_os = "linux")]
    return linux::run_event_loop(ui, shutdown);

    #[cfg(not(target_os = "linux"))]
    return polling::run_event_loop(ui, shutdown);
}

fn build_tray(menus: &ProfileMenus, icon: Icon) -> Result<TrayIcon> {
    let tray_icon = TrayIconBuilder::new()
        .with_menu(Box::new(menus.menu().clone()))
        .with_tooltip(TOOLTIP)
        .with_icon(icon)
        .build()?;
    Ok(tray_icon)
}

struct UiState {
    menus: ProfileMenus,
    ui: TrayUi,
    shutdown: CancellationToken,
}

impl UiState {
    /// Applies pending menu changes and routes clicks. Returns false once the UI should stop.
    fn tick(&mut self) -> bool {
        while let Ok(command) = self.ui.commands.try_recv() {
            self.menus.apply(command);
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            log::debug!("Menu event: {}", event.id.0);
            match self.ui.router.route(&event.id.0) {
                Ok(HandlerResult::Quit) => {
                    log::info!("Quitting application");
                    self.shutdown.cancel();
                    return false;
                }
                Ok(HandlerResult::Continue) => {}
                Err(e) => log::error!("Error handling menu event: {}", e),
            }
        }

        !self.shutdown.is_cancelled()
    }
}
