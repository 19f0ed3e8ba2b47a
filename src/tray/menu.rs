use crate::launcher::ProfileAction;
use crate::menu::router::{EventHandler, EventRoute, EventRouter};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tokio::sync::mpsc;

pub const QUIT_ID: &str = "__quit__";
const PROFILE_ID_PREFIX: &str = "profile::";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Running,
    Stopped,
    DoesNotExist,
}

impl Indicator {
    pub fn marker(self) -> &'static str {
        match self {
            Indicator::Running => "🟢",
            Indicator::Stopped => "🔴",
            Indicator::DoesNotExist => "⚪",
        }
    }
}

pub fn menu_id(profile: &str, action: ProfileAction) -> String {
    format!("{}{}::{}", PROFILE_ID_PREFIX, profile, action.as_arg())
}

pub fn submenu_label(profile: &str, indicator: Option<Indicator>) -> String {
    match indicator {
        Some(indicator) => format!("{} {}", indicator.marker(), profile),
        None => profile.to_string(),
    }
}

pub struct ProfileClicks {
    pub start: mpsc::UnboundedReceiver<()>,
    pub stop: mpsc::UnboundedReceiver<()>,
}

/// What the tracker needs from the tray toolkit. Calls must not block.
pub trait MenuSurface: Send + Sync {
    fn add_profile(&self, profile: &str) -> ProfileClicks;
    fn set_indicator(&self, profile: &str, indicator: Indicator);
    fn remove_profile(&self, profile: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    AddProfile(String),
    SetIndicator(String, Indicator),
    RemoveProfile(String),
}

/// Forwards menu changes to the UI thread and wires clicks through the router.
pub struct TrayMenuSurface {
    commands: Sender<MenuCommand>,
    router: Arc<EventRouter>,
}

impl TrayMenuSurface {
    pub fn new(commands: Sender<MenuCommand>, router: Arc<EventRouter>) -> Self {
        Self { commands, router }
    }

    fn send(&self, command: MenuCommand) {
        if self.commands.send(command).is_err() {
            log::debug!("Tray UI has exited; dropping menu update");
        }
    }

    fn register_click(&self, profile: &str, action: ProfileAction) -> mpsc::UnboundedReceiver<()> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.router.register(EventRoute {
            id: menu_id(profile, action),
            handler: EventHandler::Click(tx),
        });
        rx
    }
}

impl MenuSurface for TrayMenuSurface {
    fn add_profile(&self, profile: &str) -> ProfileClicks {
        let clicks = ProfileClicks {
            start: self.register_click(profile, ProfileAction::Start),
            stop: self.register_click(profile, ProfileAction::Stop),
        };
        self.send(MenuCommand::AddProfile(profile.to_string()));
        clicks
    }

    fn set_indicator(&self, profile: &str, indicator: Indicator) {
        self.send(MenuCommand::SetIndicator(profile.to_string(), indicator));
    }

    fn remove_profile(&self, profile: &str) {
        for action in ProfileAction::ALL {
            self.router.unregister(&menu_id(profile, action));
        }
        self.send(MenuCommand::RemoveProfile(profile.to_string()));
    }
}
