//! jhost - native launcher for an embedded Java application.
//!
//! # Architecture
//!
//! The binary owns the process: working directory, log sink, console,
//! splash, pid file, and the stop hook. Everything between "find a runtime"
//! and "supervise it" is [`jhost_core::Launcher`], run on a dedicated host
//! thread against the JNI implementation in [`jhost_jni`].
//!
//! ```text
//! main() -> setup -> config -> tracing -> Launcher::run (host thread)
//!                                              |
//!                 stop event -> shutdown() -> StopHandle::stop -> exit
//! ```

mod notify;
mod service;
mod setup;
mod splash;

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::{Context, Result};
use jhost_config::{LauncherConfig, LoggingConfig};
use jhost_core::{
    HostRegistry, LaunchError, LaunchSettings, Launcher, ShutdownOutcome, SupervisorReport,
    shutdown, stop_channel,
};
use jhost_jni::{JniLoader, JniRuntime};
use jhost_types::EntryPointDescriptor;
use jhost_utils::PidFile;
use tokio::sync::oneshot;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::splash::BitmapSplash;

/// How long to wait for the host thread once the supervisor has been told to stop.
const HOST_STOP_TIMEOUT: Duration = Duration::from_secs(10);

type HostResult = Result<SupervisorReport, LaunchError>;

fn init_tracing(logging: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match open_log_file(logging) {
        Ok(file) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .with(env_filter)
                .init();
            tracing::info!(path = %logging.file.display(), "Logging initialized");
        }
        // No sink is not a reason to stop launching.
        Err(_) => tracing_subscriber::registry().with(env_filter).init(),
    }
}

fn open_log_file(logging: &LoggingConfig) -> std::io::Result<File> {
    if let Some(parent) = logging.file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.create(true);
    if logging.erase_on_start {
        options.write(true).truncate(true);
    } else {
        options.append(true);
    }
    options.open(&logging.file)
}

/// Record a previous instance's pid, then claim the file for this process.
fn claim_pid_file(path: &Path) -> Option<PidFile> {
    match PidFile::read_existing(path) {
        Ok(Some(pid)) => tracing::info!(pid, path = %path.display(), "Found pid of a previous instance"),
        Ok(None) => {}
        Err(e) => tracing::warn!(path = %path.display(), "Unreadable pid file: {e}"),
    }
    match PidFile::create_for_current_process(path) {
        Ok(file) => Some(file),
        Err(e) => {
            tracing::warn!(path = %path.display(), "Failed to write pid file: {e}");
            None
        }
    }
}

fn finish(result: Result<HostResult, oneshot::error::RecvError>) -> ExitCode {
    match result {
        Ok(Ok(report)) => {
            tracing::info!(polls = report.polls, faults = report.faults, "Launcher exiting");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            notify::fatal(&e);
            ExitCode::FAILURE
        }
        Err(_) => {
            tracing::error!("Runtime host thread ended without a result");
            ExitCode::FAILURE
        }
    }
}

async fn graceful_shutdown(runtime: Option<Arc<JniRuntime>>, entry: EntryPointDescriptor) {
    let Some(runtime) = runtime else {
        tracing::info!("Runtime not created; nothing to shut down");
        return;
    };
    match tokio::task::spawn_blocking(move || shutdown(&*runtime, &entry)).await {
        Ok(Ok(ShutdownOutcome::Graceful)) => tracing::info!("Application shut down"),
        Ok(Ok(ShutdownOutcome::NoShutdownHook)) => {
            tracing::info!("Application has no shutdown hook");
        }
        Ok(Err(e)) => tracing::warn!("Shutdown failed: {e}"),
        Err(e) => tracing::warn!("Shutdown task failed: {e}"),
    }
}

async fn run() -> Result<ExitCode> {
    let exe_dir = setup::enter_exe_dir()?;
    let (config, config_error) = LauncherConfig::load_or_default(&exe_dir);
    init_tracing(&config.logging);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %exe_dir.display(),
        "Launcher starting"
    );
    if let Some(e) = config_error {
        tracing::warn!("{e}; using defaults");
    }

    setup::enable_debug_privilege();
    if config.launcher.hide_console {
        setup::hide_console();
    }
    let _pid_file = if config.pid_file.enabled {
        claim_pid_file(&config.pid_file.path)
    } else {
        None
    };

    let settings = LaunchSettings::from_config(&config);
    let entry = settings.entry.clone();
    let splash = Arc::new(BitmapSplash::new(config.launcher.splash_image.clone()));
    let launcher = Launcher::new(HostRegistry::new(), JniLoader::new(), settings, splash);

    let published: Arc<OnceLock<Arc<JniRuntime>>> = Arc::default();
    let (stop_handle, stop_signal) = stop_channel();
    let (done_tx, mut done_rx) = oneshot::channel::<HostResult>();

    let slot = Arc::clone(&published);
    std::thread::Builder::new()
        .name("runtime-host".into())
        .spawn(move || {
            let result = launcher.run(
                |runtime| {
                    let _ = slot.set(Arc::clone(runtime));
                },
                &stop_signal,
            );
            let _ = done_tx.send(result);
        })
        .context("failed to start runtime host thread")?;

    let stop = tokio::select! {
        result = &mut done_rx => return Ok(finish(result)),
        stop = service::wait_for_stop() => stop,
    };
    match stop {
        Ok(reason) => tracing::info!(%reason, "Stop requested"),
        Err(e) => {
            tracing::warn!("Failed to listen for stop events: {e}");
            return Ok(finish(done_rx.await));
        }
    }

    graceful_shutdown(published.get().cloned(), entry).await;
    stop_handle.stop();
    match tokio::time::timeout(HOST_STOP_TIMEOUT, &mut done_rx).await {
        Ok(result) => Ok(finish(result)),
        Err(_) => {
            tracing::warn!("Runtime host still busy in the entry point; exiting anyway");
            Ok(ExitCode::SUCCESS)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("jhost: {e:#}");
            ExitCode::FAILURE
        }
    }
}
