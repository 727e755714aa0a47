//! Runtime discovery, bootstrap, and supervision for jhost.
//!
//! The pipeline runs on one thread: [`locate`] an installation, [`resolve`]
//! its library, [`bootstrap`] the runtime, [`invoke`] the entry point, then
//! [`Supervisor::run`] until stopped. [`shutdown`] is the one operation that
//! may run on another thread, concurrently with supervision.
//!
//! [`Launcher`] owns the context for all of it; the runtime itself is only
//! reached through the traits in [`runtime`].

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

pub mod bootstrap;
pub mod collaborators;
pub mod errors;
pub mod invoker;
pub mod launcher;
pub mod locator;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod shutdown;
pub mod supervisor;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use bootstrap::{Bootstrapped, bootstrap};
pub use collaborators::{NoSplash, Splash};
pub use errors::{
    AttachError, BootstrapError, FailureCategory, InvokeError, LaunchError, LocateError,
    MarshalError, RegistryError, ResolveError, ShutdownError,
};
pub use invoker::invoke;
pub use launcher::{LaunchSettings, Launcher};
pub use locator::{VersionCandidate, installed_versions, locate, select_newest};
pub use registry::{HostRegistry, RegistrySource};
pub use resolver::{probe_library, registry_library, resolve};
pub use runtime::{
    AttachGuard, CallArgs, EnvOf, Fault, ManagedRuntime, RuntimeEnv, RuntimeLibrary,
    RuntimeLoader, RuntimeOf,
};
pub use shutdown::{ShutdownOutcome, shutdown};
pub use supervisor::{
    StopHandle, StopSignal, Supervisor, SupervisorReport, SupervisorState, stop_channel,
};
