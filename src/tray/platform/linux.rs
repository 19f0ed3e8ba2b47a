use super::{build_tray, UiState, POLL_INTERVAL};
use crate::menu::builder::ProfileMenus;
use crate::tray::{icon, TrayUi};
use anyhow::{Context, Result};
use gtk::{self, glib};
use tokio_util::sync::CancellationToken;

pub fn run_event_loop(ui: TrayUi, shutdown: CancellationToken) -> Result<()> {
    gtk::init().context("Failed to initialize GTK")?;

    let menus = ProfileMenus::build()?;
    let tray_icon = build_tray(&menus, icon::create_icon()?)?;
    let mut state = UiState { menus, ui, shutdown };

    glib::timeout_add_local(POLL_INTERVAL, move || {
        let _keep_alive = &tray_icon;
        if state.tick() {
            return glib::ControlFlow::Continue;
        }
        gtk::main_quit();
        glib::ControlFlow::Break
    });

    gtk::main();
    Ok(())
}
