//! Installed runtime descriptions produced by discovery.

use std::fmt;
use std::path::{Path, PathBuf};

/// File name of the loadable runtime library inside an installation.
pub const RUNTIME_LIBRARY_NAME: &str = "jvm.dll";

/// The installation registries searched for a runtime, in search order.
///
/// `Configured` marks an installation supplied by configuration rather than
/// discovered in a registry; it has no registry key of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeVendor {
    JavaSoft,
    Ibm,
    Configured,
}

impl RuntimeVendor {
    /// Registry vendors in the order they are queried.
    pub const REGISTRY_VENDORS: [RuntimeVendor; 2] = [RuntimeVendor::JavaSoft, RuntimeVendor::Ibm];

    /// Registry root (under `HKEY_LOCAL_MACHINE`) holding this vendor's installations.
    #[must_use]
    pub const fn registry_root(self) -> Option<&'static str> {
        match self {
            Self::JavaSoft => Some(r"SOFTWARE\JavaSoft\Java Runtime Environment"),
            Self::Ibm => Some(r"SOFTWARE\IBM\Java2 Runtime Environment"),
            Self::Configured => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::JavaSoft => "javasoft",
            Self::Ibm => "ibm",
            Self::Configured => "configured",
        }
    }
}

impl fmt::Display for RuntimeVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The winning runtime installation for this process.
///
/// Fields are private; the version string is kept exactly as read because
/// vendor selection compares it lexicographically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInstallation {
    vendor: RuntimeVendor,
    version: String,
    home: PathBuf,
}

impl RuntimeInstallation {
    #[must_use]
    pub fn new(vendor: RuntimeVendor, version: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            vendor,
            version: version.into(),
            home: home.into(),
        }
    }

    /// An installation whose home directory came from configuration.
    #[must_use]
    pub fn configured(home: impl Into<PathBuf>) -> Self {
        Self::new(RuntimeVendor::Configured, String::new(), home)
    }

    #[must_use]
    pub fn vendor(&self) -> RuntimeVendor {
        self.vendor
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// `home\bin`, the only directory the runtime's dependencies are loaded from.
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.home.join("bin")
    }

    /// The per-version registry key (`<root>\<version>`) this installation was read from.
    #[must_use]
    pub fn version_key(&self) -> Option<String> {
        let root = self.vendor.registry_root()?;
        Some(format!(r"{root}\{}", self.version))
    }
}

/// Absolute path to the loadable runtime library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeLibraryPath(PathBuf);

impl RuntimeLibraryPath {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> PathBuf {
        self.0
    }
}

impl fmt::Display for RuntimeLibraryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
