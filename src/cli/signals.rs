//! Turning OS interrupts into session commands

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::SessionCommand;

/// Wait for SIGINT or SIGTERM
#[cfg(unix)]
async fn interrupted() -> Result<(), std::io::Error> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
    Ok(())
}

#[cfg(not(unix))]
async fn interrupted() -> Result<(), std::io::Error> {
    tokio::signal::ctrl_c().await
}

/// Send `Cancel` to the session on the first interrupt, so the memo is
/// discarded and the microphone released before the process exits.
pub fn cancel_on_interrupt(commands: mpsc::Sender<SessionCommand>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match interrupted().await {
            Ok(()) => {
                debug!("interrupt received; cancelling session");
                let _ = commands.send(SessionCommand::Cancel).await;
            }
            Err(e) => debug!(error = %e, "cannot install signal handler"),
        }
    })
}
