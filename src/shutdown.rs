//! Shutdown signal handling.

use std::io;

/// SIGINT / SIGTERM listeners, installed before the control loop starts so
/// a failure to install them stops startup instead of the running loop.
pub struct ShutdownSignals {
    #[cfg(unix)]
    sigint: tokio::signal::unix::Signal,
    #[cfg(unix)]
    sigterm: tokio::signal::unix::Signal,
}

impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            Ok(Self {
                sigint: signal(SignalKind::interrupt())?,
                sigterm: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(not(unix))]
        {
            Ok(Self {})
        }
    }

    /// Resolves when the first shutdown signal arrives.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        {
            tokio::select! {
                _ = self.sigint.recv() => log::info!("Received SIGINT, shutting down"),
                _ = self.sigterm.recv() => log::info!("Received SIGTERM, shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::warn!("Ctrl+C handler failed: {e}");
            }
            log::info!("Received Ctrl+C, shutting down");
        }
    }
}
