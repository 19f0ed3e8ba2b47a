use super::{build_tray, UiState, POLL_INTERVAL};
use crate::menu::builder::ProfileMenus;
use crate::tray::{icon, TrayUi};
use anyhow::Result;
use tokio_util::sync::CancellationToken;

pub fn run_event_loop(ui: TrayUi, shutdown: CancellationToken) -> Result<()> {
    let menus = ProfileMenus::build()?;
    let _tray_icon = build_tray(&menus, icon::create_icon()?)?;
    let mut state = UiState { menus, ui, shutdown };

    while state.tick() {
        std::thread::sleep(POLL_INTERVAL);
    }
    Ok(())
}
