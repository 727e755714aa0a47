//! Core domain types for jhost.
//!
//! This crate contains pure domain types with no IO, no FFI, and minimal
//! dependencies. The discovery, bootstrap, and supervision layers all speak
//! in these types.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod entry;
mod installation;
mod options;

pub use entry::{
    ApplicationArguments, DEFAULT_ENTRY_CLASS, ENTRY_METHOD, ENTRY_SIGNATURE,
    EntryPointDescriptor, SHUTDOWN_METHOD, SHUTDOWN_SIGNATURE,
};
pub use installation::{
    RUNTIME_LIBRARY_NAME, RuntimeInstallation, RuntimeLibraryPath, RuntimeVendor,
};
pub use options::{BootstrapOptions, CLASSPATH_OPTION_PREFIX, EmptyClasspathError};
