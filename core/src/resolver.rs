//! Library Resolver: from a runtime home to the library to load.
//!
//! Tier 1 is the installation's own `RuntimeLib` registry value, used verbatim
//! (no existence check) whenever it is non-empty. Tier 2 probes
//! `home\bin\client` and then `home\bin\server`; the first openable library wins.

use std::fs::File;
use std::path::{Path, PathBuf};

use jhost_types::{RUNTIME_LIBRARY_NAME, RuntimeInstallation, RuntimeLibraryPath};

use crate::errors::ResolveError;
use crate::registry::{RUNTIME_LIB_VALUE, RegistrySource};

/// Subdirectories of `home\bin` probed for the library, in order.
pub const PROBE_FLAVORS: [&str; 2] = ["client", "server"];

/// Tier 1: the library named by installation metadata, if any.
pub fn registry_library(
    registry: &impl RegistrySource,
    installation: &RuntimeInstallation,
) -> Option<RuntimeLibraryPath> {
    let key = installation.version_key()?;
    match registry.read_string(&key, RUNTIME_LIB_VALUE) {
        Ok(path) if !path.trim().is_empty() => {
            tracing::info!(path = %path, "Registry: runtime library path");
            Some(RuntimeLibraryPath::new(path))
        }
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(key = %key, "No runtime library in registry metadata: {e}");
            None
        }
    }
}

fn candidate_path(home: &Path, flavor: &str) -> PathBuf {
    home.join("bin").join(flavor).join(RUNTIME_LIBRARY_NAME)
}

/// Tier 2: probe the conventional subdirectories of `home\bin`.
pub fn probe_library(home: &Path) -> Result<RuntimeLibraryPath, ResolveError> {
    for flavor in PROBE_FLAVORS {
        let candidate = candidate_path(home, flavor);
        tracing::debug!(path = %candidate.display(), "Checking for runtime library");
        if File::open(&candidate).is_ok() {
            tracing::info!(path = %candidate.display(), "Found runtime library");
            return Ok(RuntimeLibraryPath::new(candidate));
        }
    }
    Err(ResolveError::NotFound {
        home: home.to_path_buf(),
    })
}

/// Resolve the library for `installation`, metadata first.
pub fn resolve(
    registry: &impl RegistrySource,
    installation: &RuntimeInstallation,
) -> Result<RuntimeLibraryPath, ResolveError> {
    if let Some(path) = registry_library(registry, installation) {
        return Ok(path);
    }
    probe_library(installation.home())
}
