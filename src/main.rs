use anyhow::Result;
use clap::Parser;
use profile_tray::cli::{self, Cli, Commands};
use profile_tray::driver::{self, RunMode};
use profile_tray::launcher::Launcher;
use profile_tray::lifecycle::{MachineStore, StatusProber};
use profile_tray::profiles::DirProfileSource;
use profile_tray::settings::Settings;
use profile_tray::tracker::Tracker;
use profile_tray::{paths, tray};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let runtime = Runtime::new()?;

    let mode = RunMode::from_env();
    if matches!(mode, RunMode::Driver { .. }) {
        return runtime.block_on(run_driver(mode));
    }

    let cli = Cli::parse();
    let settings = Settings::load()?;

    match cli.command.unwrap_or(Commands::Tray) {
        Commands::Tray => run_tray(&runtime, &settings),
        Commands::Start { profile } => cli::start_profile(&settings, &profile),
        Commands::Stop { profile } => cli::stop_profile(&settings, &profile),
        Commands::Status { profile } => cli::show_status(&settings, &profile),
        Commands::Profiles => cli::list_profiles(&settings),
        Commands::Driver { name } => runtime.block_on(run_driver(RunMode::Driver { name })),
    }
}

async fn run_driver(mode: RunMode) -> Result<()> {
    let shutdown = CancellationToken::new();
    spawn_ctrl_c(shutdown.clone());
    driver::start_driver(&mode, tokio::io::stdout(), shutdown).await?;
    Ok(())
}

fn run_tray(runtime: &Runtime, settings: &Settings) -> Result<()> {
    log::info!("Starting Profile Tray...");

    let profiles_dir = settings.profiles_dir()?;
    let source = DirProfileSource::new(profiles_dir.clone());
    source.ensure_root()?;

    let launcher = Launcher::detect(paths::current_executable()?);
    if !launcher.is_supported() {
        log::warn!("Start/Stop actions are not available on {}", std::env::consts::OS);
    }

    let (surface, ui) = tray::channel();
    let tracker = Tracker::new(
        Arc::new(source),
        StatusProber::new(Arc::new(MachineStore::new(profiles_dir))),
        Arc::new(launcher),
        Arc::new(surface),
        settings.intervals(),
    );
    let shutdown = tracker.shutdown_token();

    let _guard = runtime.enter();
    let tracker_task = tokio::spawn(Arc::clone(&tracker).run());
    spawn_ctrl_c(shutdown.clone());

    log::info!("Profile Tray started successfully");
    tray::platform::run_event_loop(ui, shutdown.clone())?;

    shutdown.cancel();
    log::info!("Shutdown signal received, exiting...");
    if let Err(e) = runtime.block_on(tracker_task) {
        log::error!("Tracker task failed: {}", e);
    }
    Ok(())
}

fn spawn_ctrl_c(shutdown: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            shutdown.cancel();
        }
    });
}
