//! The JNI invocation API as a jhost runtime.
//!
//! [`JniLoader`] maps `jvm.dll` and resolves `JNI_CreateJavaVM`;
//! [`JniLibrary::create`](jhost_core::RuntimeLibrary::create) boots the VM
//! with `JNI_VERSION_1_4` and `ignoreUnrecognized = JNI_FALSE`.

#![allow(clippy::missing_errors_doc)]

mod loader;
mod vm;

pub use loader::{CREATE_SYMBOL, JniLibrary, JniLoader};
pub use vm::{JniEnv, JniRuntime};
