//! The narrow interface this crate needs from a loadable managed runtime.
//!
//! ```text
//! RuntimeLoader::load ──> RuntimeLibrary::create ──> (ManagedRuntime, RuntimeEnv)
//!                                                         │            │
//!                                   attach/detach per thread        thread-affine calls
//! ```
//!
//! [`RuntimeEnv`] values are tied to the thread that obtained them: the
//! creating thread gets one from `create`, every other thread goes through
//! [`AttachGuard::attach`], which detaches again when dropped.

use std::io;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use jhost_types::{BootstrapOptions, RuntimeLibraryPath};

use crate::errors::{AttachError, BootstrapError, MarshalError};

/// Arguments for a static `void` method call.
#[derive(Debug, Clone, Copy)]
pub enum CallArgs<'a> {
    /// `()V`
    None,
    /// `([Ljava/lang/String;)V`, marshaled in order.
    Strings(&'a [String]),
}

/// An uncaught fault taken from the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    description: String,
}

impl Fault {
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Calls made on a runtime from one thread.
pub trait RuntimeEnv {
    type Class: Copy;
    type Method: Copy;

    /// Look up a class by slash-separated name.
    fn find_class(&mut self, name: &str) -> Option<Self::Class>;

    fn find_static_method(
        &mut self,
        class: Self::Class,
        name: &str,
        signature: &str,
    ) -> Option<Self::Method>;

    /// Call a static `void` method. May block for as long as the method runs.
    fn call_static_void(
        &mut self,
        class: Self::Class,
        method: Self::Method,
        args: CallArgs<'_>,
    ) -> Result<(), MarshalError>;

    /// If a fault is outstanding, describe it to the runtime's own
    /// diagnostics, clear it, and return it.
    fn take_fault(&mut self) -> Option<Fault>;
}

/// A created runtime instance, shared by every thread that calls into it.
pub trait ManagedRuntime: Send + Sync {
    type Env: RuntimeEnv;

    fn attach_current_thread(&self) -> Result<Self::Env, AttachError>;

    fn detach_current_thread(&self);
}

pub type EnvOf<R> = <R as ManagedRuntime>::Env;

/// A loaded runtime library that has not created its runtime yet.
///
/// `create` consumes the library: a process creates at most one runtime.
pub trait RuntimeLibrary {
    type Runtime: ManagedRuntime;

    fn create(
        self,
        options: &BootstrapOptions,
    ) -> Result<(Self::Runtime, EnvOf<Self::Runtime>), BootstrapError>;
}

pub trait RuntimeLoader {
    type Library: RuntimeLibrary;

    /// Restrict where the library's own dependencies are searched for.
    fn restrict_search_path(&self, dir: &Path) -> io::Result<()>;

    /// Load the library and resolve its creation entry point.
    fn load(&self, path: &RuntimeLibraryPath) -> Result<Self::Library, BootstrapError>;
}

pub type RuntimeOf<L> = <<L as RuntimeLoader>::Library as RuntimeLibrary>::Runtime;

/// Thread attachment held for the guard's lifetime.
///
/// Detach runs on every exit path, including early returns and panics.
pub struct AttachGuard<'rt, R: ManagedRuntime> {
    runtime: &'rt R,
    env: R::Env,
}

impl<'rt, R: ManagedRuntime> AttachGuard<'rt, R> {
    pub fn attach(runtime: &'rt R) -> Result<Self, AttachError> {
        let env = runtime.attach_current_thread()?;
        tracing::debug!("Attached thread to runtime");
        Ok(Self { runtime, env })
    }
}

impl<R: ManagedRuntime> Deref for AttachGuard<'_, R> {
    type Target = R::Env;

    fn deref(&self) -> &Self::Target {
        &self.env
    }
}

impl<R: ManagedRuntime> DerefMut for AttachGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.env
    }
}

impl<R: ManagedRuntime> Drop for AttachGuard<'_, R> {
    fn drop(&mut self) {
        self.runtime.detach_current_thread();
        tracing::debug!("Detached thread");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRuntime;

    #[test]
    fn guard_detaches_on_drop() {
        let runtime = MockRuntime::default();
        {
            let _guard = AttachGuard::attach(&runtime).unwrap();
            assert_eq!(runtime.attached(), 1);
        }
        assert_eq!(runtime.attached(), 0);
        assert_eq!(runtime.stats().detaches, 1);
    }

    #[test]
    fn guard_detaches_when_unwinding() {
        let runtime = MockRuntime::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = AttachGuard::attach(&runtime).unwrap();
            panic!("fault while attached");
        }));
        assert!(result.is_err());
        assert_eq!(runtime.attached(), 0);
    }

    #[test]
    fn failed_attach_does_not_detach() {
        let runtime = MockRuntime::default().with_attach_failure(-2);
        let err = AttachGuard::attach(&runtime).err().unwrap();
        assert_eq!(err.code, -2);
        assert_eq!(runtime.stats().detaches, 0);
    }
}
