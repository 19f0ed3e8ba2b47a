use crate::lifecycle::{MachineStore, StatusProber};
use crate::profiles::{DirProfileSource, ProfileSource};
use crate::settings::Settings;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "profile-tray")]
#[command(about = "System tray for starting and stopping VM profiles")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Run the system tray (default)
    Tray,

    /// Start a profile
    Start {
        /// Profile name
        #[arg(long)]
        profile: String,
    },

    /// Stop a profile
    Stop {
        /// Profile name
        #[arg(long)]
        profile: String,
    },

    /// Show the run state of a profile
    Status {
        /// Profile name
        #[arg(long)]
        profile: String,
    },

    /// List known profiles
    Profiles,

    /// Serve as a machine driver plugin
    Driver {
        /// Driver name
        #[arg(long)]
        name: String,
    },
}

pub fn start_profile(settings: &Settings, profile: &str) -> Result<()> {
    let store = MachineStore::new(settings.profiles_dir()?);
    store
        .mark_running(profile)
        .with_context(|| format!("Failed to start profile {}", profile))?;
    println!("Profile '{}' started", profile);
    Ok(())
}

pub fn stop_profile(settings: &Settings, profile: &str) -> Result<()> {
    let store = MachineStore::new(settings.profiles_dir()?);
    store
        .mark_stopped(profile)
        .with_context(|| format!("Failed to stop profile {}", profile))?;
    println!("Profile '{}' stopped", profile);
    Ok(())
}

pub fn show_status(settings: &Settings, profile: &str) -> Result<()> {
    let prober = StatusProber::new(Arc::new(MachineStore::new(settings.profiles_dir()?)));
    println!("{}", prober.probe(profile));
    Ok(())
}

pub fn list_profiles(settings: &Settings) -> Result<()> {
    let source = DirProfileSource::new(settings.profiles_dir()?);
    for profile in source.list_profiles()? {
        println!("{}", profile);
    }
    Ok(())
}
