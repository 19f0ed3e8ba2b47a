pub mod icon;
pub mod menu;
pub mod platform;

use crate::menu::router::{EventHandler, EventRoute, EventRouter};
use menu::{MenuCommand, TrayMenuSurface, QUIT_ID};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// UI-thread half of the tray: pending menu changes plus the click router.
pub struct TrayUi {
    pub commands: Receiver<MenuCommand>,
    pub router: Arc<EventRouter>,
}

/// Creates the surface handed to the tracker and the UI half run on the main thread.
pub fn channel() -> (TrayMenuSurface, TrayUi) {
    let (tx, rx) = mpsc::channel();
    let router = Arc::new(EventRouter::new(vec![EventRoute {
        id: QUIT_ID.to_string(),
        handler: EventHandler::Quit,
    }]));

    let surface = TrayMenuSurface::new(tx, router.clone());
    (surface, TrayUi { commands: rx, router })
}
