//! Shutdown signal handling

use tokio_util::sync::CancellationToken;

/// Completes on SIGINT, SIGTERM or Ctrl-C
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Cancel `token` when a shutdown signal arrives
pub fn cancel_on_signal(token: CancellationToken) {
    tokio::spawn(async move {
        tokio::select! {
            res = wait_for_shutdown_signal() => {
                match res {
                    Ok(()) => tracing::warn!("Shutdown signal received, stopping scan"),
                    Err(e) => {
                        tracing::warn!("Failed to install signal handlers: {}", e);
                        return;
                    }
                }
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
}
