//! The host stop hook: the lifecycle events that ask the launcher to stop.
//!
//! ## Windows
//! Ctrl+C, console close, and system shutdown.
//!
//! ## Unix
//! SIGINT and SIGTERM.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupt,
    Close,
    Shutdown,
    Terminate,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Interrupt => "interrupt",
            Self::Close => "console close",
            Self::Shutdown => "system shutdown",
            Self::Terminate => "terminate",
        })
    }
}

#[cfg(windows)]
pub async fn wait_for_stop() -> std::io::Result<StopReason> {
    use tokio::signal::windows::{ctrl_c, ctrl_close, ctrl_shutdown};

    let mut interrupt = ctrl_c()?;
    let mut close = ctrl_close()?;
    let mut shutdown = ctrl_shutdown()?;

    let reason = tokio::select! {
        _ = interrupt.recv() => StopReason::Interrupt,
        _ = close.recv() => StopReason::Close,
        _ = shutdown.recv() => StopReason::Shutdown,
    };
    Ok(reason)
}

#[cfg(unix)]
pub async fn wait_for_stop() -> std::io::Result<StopReason> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let reason = tokio::select! {
        _ = sigint.recv() => StopReason::Interrupt,
        _ = sigterm.recv() => StopReason::Terminate,
    };
    Ok(reason)
}

#[cfg(not(any(unix, windows)))]
pub async fn wait_for_stop() -> std::io::Result<StopReason> {
    tokio::signal::ctrl_c().await?;
    Ok(StopReason::Interrupt)
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Command;
    use std::time::Duration;

    use super::*;

    async fn stop_after_signal(name: &str) -> StopReason {
        let waiter = tokio::spawn(wait_for_stop());
        // Let the listeners register before the signal is raised.
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = Command::new("kill")
            .args([format!("-{name}"), std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn each_signal_maps_to_one_reason() {
        assert_eq!(stop_after_signal("TERM").await, StopReason::Terminate);
        assert_eq!(stop_after_signal("INT").await, StopReason::Interrupt);
    }
}
