use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("could not find {0} in PATH")]
    ShellNotFound(String),

    #[error("launching profiles is not supported on {0}")]
    Unsupported(&'static str),

    #[error("failed to write launch script: {0}")]
    Script(#[source] std::io::Error),

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code:?}")]
    Failed { program: String, code: Option<i32> },
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("profile does not exist: {0}")]
    NotFound(String),

    #[error("invalid profile name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed machine state: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("failed to bind driver listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("failed to announce listener address: {0}")]
    Announce(#[source] std::io::Error),
}
