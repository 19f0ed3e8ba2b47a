use crate::launcher::ProfileAction;
use crate::tray::menu::{menu_id, submenu_label, MenuCommand, QUIT_ID};
use anyhow::Result;
use std::collections::HashMap;
use tray_icon::menu::{Menu, MenuItem, PredefinedMenuItem, Submenu};

/// Toolkit-side view of the tray menu: Exit, a separator, then one submenu per profile.
pub struct ProfileMenus {
    menu: Menu,
    submenus: HashMap<String, Submenu>,
}

impl ProfileMenus {
    pub fn build() -> Result<Self> {
        let menu = Menu::new();

        let quit_item = MenuItem::with_id(QUIT_ID, "Exit", true, None);
        menu.append(&quit_item)?;
        menu.append(&PredefinedMenuItem::separator())?;

        Ok(Self { menu, submenus: HashMap::new() })
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn apply(&mut self, command: MenuCommand) {
        let result = match command {
            MenuCommand::AddProfile(profile) => self.add_profile(profile),
            MenuCommand::SetIndicator(profile, indicator) => {
                if let Some(submenu) = self.submenus.get(&profile) {
                    submenu.set_text(submenu_label(&profile, Some(indicator)));
                }
                Ok(())
            }
            MenuCommand::RemoveProfile(profile) => self.remove_profile(&profile),
        };

        if let Err(e) = result {
            log::error!("Failed to update tray menu: {}", e);
        }
    }

    fn add_profile(&mut self, profile: String) -> Result<()> {
        if self.submenus.contains_key(&profile) {
            return Ok(());
        }

        let submenu = Submenu::new(submenu_label(&profile, None), true);
        for action in ProfileAction::ALL {
            let item = MenuItem::with_id(menu_id(&profile, action), action.label(), true, None);
            submenu.append(&item)?;
        }
        self.menu.append(&submenu)?;

        log::debug!("Added tray submenu for profile {}", profile);
        self.submenus.insert(profile, submenu);
        Ok(())
    }

    fn remove_profile(&mut self, profile: &str) -> Result<()> {
        let Some(submenu) = self.submenus.remove(profile) else { return Ok(()) };
        self.menu.remove(&submenu)?;
        log::debug!("Removed tray submenu for profile {}", profile);
        Ok(())
    }
}
