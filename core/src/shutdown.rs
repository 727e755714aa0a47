//! Shutdown path: ask the embedded application to exit from another thread.

use jhost_types::{EntryPointDescriptor, SHUTDOWN_METHOD, SHUTDOWN_SIGNATURE};

use crate::errors::ShutdownError;
use crate::runtime::{AttachGuard, CallArgs, ManagedRuntime, RuntimeEnv};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The application's `shutdown()` was called.
    Graceful,
    /// The entry class has no `shutdown()`; nothing was called.
    NoShutdownHook,
}

/// Attach the calling thread, call `entry`'s `shutdown()` if it has one,
/// and detach again on every path.
///
/// Safe to call from any thread once the runtime exists, including while
/// the entry point is still running.
pub fn shutdown<R: ManagedRuntime>(
    runtime: &R,
    entry: &EntryPointDescriptor,
) -> Result<ShutdownOutcome, ShutdownError> {
    let mut env = AttachGuard::attach(runtime)?;
    let class_name = entry.class_name();

    let hook = env
        .find_class(class_name)
        .and_then(|class| {
            env.find_static_method(class, SHUTDOWN_METHOD, SHUTDOWN_SIGNATURE)
                .map(|method| (class, method))
        });
    let Some((class, method)) = hook else {
        tracing::info!(
            class = class_name,
            "No shutdown method implemented by {class_name}, shutdown will not be graceful"
        );
        return Ok(ShutdownOutcome::NoShutdownHook);
    };

    tracing::info!(class = class_name, "Calling shutdown method");
    env.call_static_void(class, method, CallArgs::None)?;
    if let Some(fault) = env.take_fault() {
        tracing::warn!(
            class = class_name,
            fault = fault.description(),
            "Shutdown method raised a fault"
        );
    }
    Ok(ShutdownOutcome::Graceful)
}
