pub mod cli;
pub mod driver;
pub mod error;
pub mod launcher;
pub mod lifecycle;
pub mod menu;
pub mod paths;
pub mod profiles;
pub mod settings;
pub mod tracker;
pub mod tray;
