//! Bootstrapper: load the resolved library and create the one runtime.

use std::sync::Arc;

use jhost_types::{BootstrapOptions, RuntimeInstallation, RuntimeLibraryPath};

use crate::errors::BootstrapError;
use crate::runtime::{EnvOf, ManagedRuntime, RuntimeLibrary, RuntimeLoader, RuntimeOf};

/// A created runtime and the creating thread's environment.
pub struct Bootstrapped<R: ManagedRuntime> {
    pub runtime: Arc<R>,
    /// Only valid on the thread that called [`bootstrap`].
    pub env: EnvOf<R>,
}

/// Restrict the search path, load `library`, and create the runtime.
///
/// The classpath option goes first, then `auxiliary` in order. An empty
/// `classpath` fails before creation is attempted; creation is never retried.
pub fn bootstrap<L, C, A>(
    loader: &L,
    installation: &RuntimeInstallation,
    library: &RuntimeLibraryPath,
    classpath: &[C],
    auxiliary: &[A],
) -> Result<Bootstrapped<RuntimeOf<L>>, BootstrapError>
where
    L: RuntimeLoader,
    C: AsRef<str>,
    A: AsRef<str>,
{
    let bin_dir = installation.bin_dir();
    if let Err(e) = loader.restrict_search_path(&bin_dir) {
        tracing::warn!(dir = %bin_dir.display(), "Failed to restrict library search path: {e}");
    }

    tracing::info!(path = %library, "Loading runtime library");
    let loaded = loader.load(library)?;

    let options = BootstrapOptions::new(classpath, auxiliary)?;
    for option in options.iter() {
        tracing::debug!(option, "Runtime option");
    }

    tracing::info!(options = options.len(), "Creating runtime");
    let (runtime, env) = loaded.create(&options).inspect_err(|e| {
        tracing::error!("Runtime creation failed: {e}");
    })?;
    tracing::info!("Runtime created");

    Ok(Bootstrapped {
        runtime: Arc::new(runtime),
        env,
    })
}
