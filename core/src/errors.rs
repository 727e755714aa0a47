//! Error taxonomy for discovery, bootstrap, invocation, and shutdown.
//!
//! Every launch failure maps to a [`FailureCategory`]; the binary turns the
//! category into the single user-facing notification.

use std::path::PathBuf;

use jhost_types::EmptyClasspathError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry key not found: {key}")]
    KeyNotFound { key: String },
    #[error("registry value '{value}' not found under {key}")]
    ValueNotFound { key: String, value: String },
    #[error("registry query {key}\\{value} failed with code {code}")]
    Os { key: String, value: String, code: u32 },
}

#[derive(Debug, Error)]
pub enum LocateError {
    /// No vendor registry has a readable current version.
    #[error("no runtime installation found in any vendor registry")]
    NotInstalled,
    /// A vendor registry names a version whose entry lacks a home directory.
    #[error("runtime registry entry {key} is malformed: {source}")]
    MalformedEntry {
        key: String,
        #[source]
        source: RegistryError,
    },
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no runtime library found under {}", home.display())]
    NotFound { home: PathBuf },
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    EmptyClasspath(#[from] EmptyClasspathError),
    #[error("failed to load runtime library {}: {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },
    #[error("runtime library {} does not export {symbol}", path.display())]
    MissingCreateSymbol { path: PathBuf, symbol: &'static str },
    #[error("runtime option contains an interior NUL: {option:?}")]
    InvalidOption { option: String },
    #[error("runtime creation failed with code {code}")]
    CreationFailed { code: i32 },
}

#[derive(Debug, Error)]
#[error("failed to attach thread to the runtime (code {code})")]
pub struct AttachError {
    pub code: i32,
}

#[derive(Debug, Error)]
#[error("failed to marshal call arguments: {0}")]
pub struct MarshalError(pub String);

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("class not found: {class}")]
    ClassNotFound { class: String },
    #[error("entry point not found: {class}.{method}{signature}")]
    EntryPointNotFound {
        class: String,
        method: &'static str,
        signature: &'static str,
    },
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error("uncaught fault during entry point: {description}")]
    UncaughtFault { description: String },
}

#[derive(Debug, Error)]
pub enum ShutdownError {
    #[error(transparent)]
    Attach(#[from] AttachError),
    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

/// Which prerequisite a launch failure points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    /// No compatible runtime installation.
    Discovery,
    /// Installation found but its library could not be loaded.
    Load,
    /// Library loaded but runtime creation was rejected.
    Init,
    /// Entry class or method missing: a packaging defect.
    EntryPoint,
    /// The entry point raised and did not catch a fault.
    RuntimeFault,
}

impl FailureCategory {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Discovery => "discovery",
            Self::Load => "load",
            Self::Init => "init",
            Self::EntryPoint => "entry-point",
            Self::RuntimeFault => "runtime-fault",
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Locate(#[from] LocateError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    #[error(transparent)]
    Invoke(#[from] InvokeError),
}

impl LaunchError {
    #[must_use]
    pub fn category(&self) -> FailureCategory {
        match self {
            Self::Locate(_) | Self::Resolve(_) => FailureCategory::Discovery,
            Self::Bootstrap(
                BootstrapError::LoadFailed { .. } | BootstrapError::MissingCreateSymbol { .. },
            ) => FailureCategory::Load,
            Self::Bootstrap(
                BootstrapError::EmptyClasspath(_)
                | BootstrapError::InvalidOption { .. }
                | BootstrapError::CreationFailed { .. },
            ) => FailureCategory::Init,
            Self::Invoke(
                InvokeError::ClassNotFound { .. }
                | InvokeError::EntryPointNotFound { .. }
                | InvokeError::Marshal(_),
            ) => FailureCategory::EntryPoint,
            Self::Invoke(InvokeError::UncaughtFault { .. }) => FailureCategory::RuntimeFault,
        }
    }
}
