//! Runtime Locator: picks the installed runtime to boot.
//!
//! Each vendor root is asked for its `CurrentVersion`. When more than one
//! vendor answers, the lexicographically greatest version string wins and a
//! tie goes to the later vendor in [`RuntimeVendor::REGISTRY_VENDORS`].
//! Plain string comparison is a known approximation of "newest" ("9" sorts
//! after "10"); it is kept as-is.

use jhost_types::{RuntimeInstallation, RuntimeVendor};

use crate::errors::{LocateError, RegistryError};
use crate::registry::{CURRENT_VERSION_VALUE, JAVA_HOME_VALUE, RegistrySource};

/// A vendor root that answered with a current version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionCandidate {
    pub vendor: RuntimeVendor,
    pub version: String,
}

/// Read `CurrentVersion` under `vendor`'s root; unreadable or empty means absent.
fn current_version(registry: &impl RegistrySource, vendor: RuntimeVendor) -> Option<String> {
    let root = vendor.registry_root()?;
    tracing::debug!(vendor = %vendor, key = root, "Opening vendor registry root");
    match registry.read_string(root, CURRENT_VERSION_VALUE) {
        Ok(version) if !version.trim().is_empty() => {
            tracing::info!(vendor = %vendor, version = %version, "Found runtime version");
            Some(version)
        }
        Ok(_) => {
            tracing::debug!(vendor = %vendor, "Empty current version; treating vendor as absent");
            None
        }
        Err(e) => {
            tracing::debug!(vendor = %vendor, "No runtime from vendor: {e}");
            None
        }
    }
}

/// Select the candidate with the greatest version string.
///
/// Candidates must be in registry search order; on equal versions the later
/// candidate wins.
#[must_use]
pub fn select_newest(candidates: &[VersionCandidate]) -> Option<&VersionCandidate> {
    candidates.iter().fold(None, |best, candidate| match best {
        Some(best) if best.version > candidate.version => Some(best),
        _ => Some(candidate),
    })
}

/// Collect the current versions of every registry vendor, in search order.
pub fn installed_versions(registry: &impl RegistrySource) -> Vec<VersionCandidate> {
    RuntimeVendor::REGISTRY_VENDORS
        .iter()
        .filter_map(|&vendor| {
            current_version(registry, vendor).map(|version| VersionCandidate { vendor, version })
        })
        .collect()
}

/// Find the newest usable installation and its home directory.
pub fn locate(registry: &impl RegistrySource) -> Result<RuntimeInstallation, LocateError> {
    let candidates = installed_versions(registry);
    let Some(winner) = select_newest(&candidates) else {
        tracing::warn!("Can't find any runtime registry entry");
        return Err(LocateError::NotInstalled);
    };
    if candidates.len() > 1 {
        tracing::info!(
            vendor = %winner.vendor,
            version = %winner.version,
            "Multiple runtime vendors installed; selected greatest version"
        );
    }

    let Some(root) = winner.vendor.registry_root() else {
        return Err(LocateError::NotInstalled);
    };
    let key = format!(r"{root}\{}", winner.version);

    match registry.read_string(&key, JAVA_HOME_VALUE) {
        Ok(home) if !home.trim().is_empty() => {
            tracing::info!(key = %key, home = %home, "Resolved runtime home");
            Ok(RuntimeInstallation::new(
                winner.vendor,
                winner.version.as_str(),
                home.trim(),
            ))
        }
        Ok(_) => {
            let source = RegistryError::ValueNotFound {
                key: key.clone(),
                value: JAVA_HOME_VALUE.to_string(),
            };
            tracing::warn!(key = %key, "Runtime registry entry has an empty home directory");
            Err(LocateError::MalformedEntry { key, source })
        }
        Err(source) => {
            tracing::warn!(key = %key, "Runtime registry entry is malformed: {source}");
            Err(LocateError::MalformedEntry { key, source })
        }
    }
}
