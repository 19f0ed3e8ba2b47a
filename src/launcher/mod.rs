use crate::error::DispatchError;
use crate::tray::menu::Indicator;
use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const SCRIPT_PREFIX: &str = "profile-tray";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileAction {
    Start,
    Stop,
}

impl ProfileAction {
    pub const ALL: [ProfileAction; 2] = [ProfileAction::Start, ProfileAction::Stop];

    pub fn as_arg(self) -> &'static str {
        match self {
            ProfileAction::Start => "start",
            ProfileAction::Stop => "stop",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileAction::Start => "Start",
            ProfileAction::Stop => "Stop",
        }
    }

    /// Indicator shown once the action has been launched successfully.
    pub fn indicator(self) -> Indicator {
        match self {
            ProfileAction::Start => Indicator::Running,
            ProfileAction::Stop => Indicator::Stopped,
        }
    }
}

impl std::fmt::Display for ProfileAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Runs `<binary> <action> --profile <name>` outside the tray process.
pub trait Dispatcher: Send + Sync {
    fn dispatch(&self, action: ProfileAction, profile: &str) -> Result<(), DispatchError>;
}

/// Platform strategy for launching the controlling binary, chosen once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Launcher {
    /// `cmd.exe /C start`, returns as soon as the child is detached.
    Shell { binary: PathBuf },
    /// One-shot script opened in a new Terminal window.
    TerminalScript { binary: PathBuf, script_dir: PathBuf },
    Unsupported { os: &'static str },
}

impl Launcher {
    pub fn detect(binary: PathBuf) -> Self {
        Self::for_os(std::env::consts::OS, binary)
    }

    pub fn for_os(os: &'static str, binary: PathBuf) -> Self {
        match os {
            "windows" => Launcher::Shell { binary },
            "macos" => Launcher::TerminalScript { binary, script_dir: std::env::temp_dir() },
            _ => Launcher::Unsupported { os },
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Launcher::Unsupported { .. })
    }

    fn build_command(&self, action: ProfileAction, profile: &str) -> Result<Command, DispatchError> {
        match self {
            Launcher::Shell { binary } => {
                let shell = find_program("cmd.exe")?;
                Ok(shell_command(&shell, binary, action, profile))
            }
            Launcher::TerminalScript { binary, script_dir } => {
                let script = write_script(script_dir, binary, action, profile)?;
                let open = find_program("open")?;
                Ok(terminal_command(&open, &script))
            }
            Launcher::Unsupported { os } => Err(DispatchError::Unsupported(*os)),
        }
    }
}

impl Dispatcher for Launcher {
    fn dispatch(&self, action: ProfileAction, profile: &str) -> Result<(), DispatchError> {
        let mut command = self.build_command(action, profile)?;
        let program = command.get_program().to_string_lossy().into_owned();

        log::info!("Launching {} for profile {} via {}", action, profile, program);
        let status = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| DispatchError::Spawn { program: program.clone(), source })?;

        if !status.success() {
            return Err(DispatchError::Failed { program, code: status.code() });
        }
        Ok(())
    }
}

pub fn profile_args(binary: &Path, action: ProfileAction, profile: &str) -> Vec<OsString> {
    vec![
        binary.as_os_str().to_owned(),
        action.as_arg().into(),
        "--profile".into(),
        profile.into(),
    ]
}

fn shell_command(shell: &Path, binary: &Path, action: ProfileAction, profile: &str) -> Command {
    let mut command = Command::new(shell);
    // The empty string is the window title; without it a quoted binary path is taken as the title.
    command.args(["/C", "start", ""]);
    command.args(profile_args(binary, action, profile));
    command
}

fn terminal_command(open: &Path, script: &Path) -> Command {
    let mut command = Command::new(open);
    command.args(["-F", "-a", "Terminal.app"]).arg(script);
    command
}

pub fn script_contents(binary: &Path, action: ProfileAction, profile: &str) -> String {
    let line = profile_args(binary, action, profile)
        .iter()
        .map(|arg| shell_quote(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");
    format!("#!/bin/sh\nrm -f \"$0\"\n{}\n", line)
}

fn shell_quote(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Writes a fresh script for this dispatch under `dir` and returns its path.
/// Each call gets its own file, so a Terminal that opens late still runs its own command.
pub fn write_script(
    dir: &Path,
    binary: &Path,
    action: ProfileAction,
    profile: &str,
) -> Result<PathBuf, DispatchError> {
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}-{}-", SCRIPT_PREFIX, action.as_arg()))
        .tempfile_in(dir)
        .map_err(DispatchError::Script)?;
    file.write_all(script_contents(binary, action, profile).as_bytes())
        .map_err(DispatchError::Script)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o744))
            .map_err(DispatchError::Script)?;
    }

    let (_, path) = file.keep().map_err(|e| DispatchError::Script(e.error))?;
    log::debug!("Wrote launch script {:?}", path);
    Ok(path)
}

fn find_program(name: &str) -> Result<PathBuf, DispatchError> {
    let path = std::env::var_os("PATH").unwrap_or_default();
    find_in(std::env::split_paths(&path), name).ok_or_else(|| DispatchError::ShellNotFound(name.to_string()))
}

fn find_in(dirs: impl IntoIterator<Item = PathBuf>, name: &str) -> Option<PathBuf> {
    dirs.into_iter().map(|dir| dir.join(name)).find(|candidate| candidate.is_file())
}
