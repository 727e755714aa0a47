//! Shared infrastructure utilities for jhost.
//!
//! - **`atomic_write`**: Crash-safe file persistence (temp + rename)
//! - **`pid_file`**: The process-identity file guard
//! - **`win32`**: UTF-16 conversion and owned handles for direct Win32 calls

pub mod atomic_write;
pub mod pid_file;
pub mod win32;

pub use atomic_write::atomic_write;
pub use pid_file::{PidFile, parse_pid};
#[cfg(windows)]
pub use win32::OwnedHandle;
pub use win32::{from_wide_until_nul, to_wide_null};
