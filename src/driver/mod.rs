//! Driver plugin mode.
//!
//! When launched as a machine driver plugin the binary does not run its
//! command tree. It listens on an ephemeral loopback port, prints the
//! listening address as the first line of its output and then serves
//! connections until shut down. The RPC spoken over those connections is
//! owned by the peer; connections are held open until the peer closes them.

use crate::error::DriverError;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

pub const PLUGIN_ENV_KEY: &str = "MACHINE_PLUGIN_TOKEN";
pub const PLUGIN_ENV_VAL: &str = "42";
pub const PLUGIN_ENV_DRIVER_NAME: &str = "MACHINE_PLUGIN_DRIVER_NAME";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Cli,
    Driver { name: String },
}

impl RunMode {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(PLUGIN_ENV_KEY).ok().as_deref(),
            std::env::var(PLUGIN_ENV_DRIVER_NAME).ok().as_deref(),
        )
    }

    pub fn from_vars(token: Option<&str>, driver: Option<&str>) -> Self {
        match (token, driver) {
            (Some(PLUGIN_ENV_VAL), Some(name)) if !name.is_empty() => RunMode::Driver { name: name.to_string() },
            _ => RunMode::Cli,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum DriverOutcome {
    /// Not launched as a plugin; the caller should run its commands.
    NotADriver,
    Stopped,
}

pub async fn start_driver<W>(mode: &RunMode, out: W, shutdown: CancellationToken) -> Result<DriverOutcome, DriverError>
where
    W: AsyncWrite + Unpin,
{
    let RunMode::Driver { name } = mode else {
        return Ok(DriverOutcome::NotADriver);
    };

    let listener = TcpListener::bind(("127.0.0.1", 0)).await.map_err(DriverError::Bind)?;
    let addr = listener.local_addr().map_err(DriverError::Bind)?;
    announce(out, &addr.to_string()).await.map_err(DriverError::Announce)?;
    log::info!("Driver plugin {} listening on {}", name, addr);

    serve(listener, shutdown).await;
    log::info!("Driver plugin {} stopped", name);
    Ok(DriverOutcome::Stopped)
}

async fn announce<W: AsyncWrite + Unpin>(mut out: W, addr: &str) -> std::io::Result<()> {
    out.write_all(format!("{}\n", addr).as_bytes()).await?;
    out.flush().await
}

async fn serve(listener: TcpListener, shutdown: CancellationToken) {
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    log::debug!("Driver connection from {}", peer);
                    tokio::spawn(hold_connection(stream, shutdown.child_token()));
                }
                Err(e) => log::warn!("Failed to accept driver connection: {}", e),
            },
        }
    }
}

async fn hold_connection(mut stream: TcpStream, cancel: CancellationToken) {
    let mut buf = [0u8; 4096];
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            read = stream.read(&mut buf) => match read {
                Ok(0) => break,
                Ok(n) => log::trace!("Driver connection received {} bytes", n),
                Err(e) => {
                    log::debug!("Driver connection closed: {}", e);
                    break;
                }
            },
        }
    }
}
