//! Loading `jvm.dll` and resolving `JNI_CreateJavaVM`.

use std::error::Error;
use std::ffi::{CString, c_void};
use std::io;
use std::mem::ManuallyDrop;
use std::path::Path;
use std::ptr;

use jhost_core::{BootstrapError, RuntimeLibrary, RuntimeLoader};
use jhost_types::{BootstrapOptions, RuntimeLibraryPath};
use jni_sys::{JNI_FALSE, JNI_OK, JNI_VERSION_1_4, JNIEnv, JavaVM, JavaVMInitArgs, JavaVMOption, jint};
use libloading::Library;

use crate::vm::{JniEnv, JniRuntime};

pub const CREATE_SYMBOL: &str = "JNI_CreateJavaVM";

type CreateJavaVm =
    unsafe extern "system" fn(*mut *mut JavaVM, *mut *mut c_void, *mut c_void) -> jint;

/// Error text including every source in the chain (the OS error lives there).
fn error_chain(e: &dyn Error) -> String {
    let mut text = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

/// Loads the runtime library from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct JniLoader;

impl JniLoader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RuntimeLoader for JniLoader {
    type Library = JniLibrary;

    #[cfg(windows)]
    fn restrict_search_path(&self, dir: &Path) -> io::Result<()> {
        use windows_sys::Win32::System::LibraryLoader::SetDllDirectoryW;

        let wide = jhost_utils::to_wide_null(dir);
        if unsafe { SetDllDirectoryW(wide.as_ptr()) } == 0 {
            return Err(io::Error::last_os_error());
        }
        tracing::debug!(dir = %dir.display(), "Library search path restricted");
        Ok(())
    }

    /// Dependent libraries resolve through the loader's own rules here.
    #[cfg(not(windows))]
    fn restrict_search_path(&self, dir: &Path) -> io::Result<()> {
        tracing::debug!(dir = %dir.display(), "Search path restriction not supported on this host");
        Ok(())
    }

    fn load(&self, path: &RuntimeLibraryPath) -> Result<JniLibrary, BootstrapError> {
        // Never unloaded, even when a later step fails.
        let library = unsafe { Library::new(path.as_path()) }
            .map(ManuallyDrop::new)
            .map_err(|e| {
                let reason = error_chain(&e);
                tracing::error!(path = %path, "Failed to load runtime library: {reason}");
                BootstrapError::LoadFailed {
                    path: path.as_path().to_path_buf(),
                    reason,
                }
            })?;

        let create_vm = unsafe { library.get::<CreateJavaVm>(b"JNI_CreateJavaVM\0") }
            .map(|symbol| *symbol)
            .map_err(|e| {
                tracing::error!(path = %path, "Can't find {CREATE_SYMBOL}: {e}");
                BootstrapError::MissingCreateSymbol {
                    path: path.as_path().to_path_buf(),
                    symbol: CREATE_SYMBOL,
                }
            })?;
        tracing::debug!(path = %path, "Resolved {CREATE_SYMBOL}");

        Ok(JniLibrary {
            _library: library,
            create_vm,
        })
    }
}

/// A loaded `jvm.dll` with its creation entry point.
///
/// The library handle is pinned for the life of the process whether or not
/// creation succeeds.
pub struct JniLibrary<H = Library> {
    _library: ManuallyDrop<H>,
    create_vm: CreateJavaVm,
}

fn c_options(options: &BootstrapOptions) -> Result<Vec<CString>, BootstrapError> {
    options
        .iter()
        .map(|option| {
            CString::new(option).map_err(|_| BootstrapError::InvalidOption {
                option: option.to_string(),
            })
        })
        .collect()
}

impl<H> RuntimeLibrary for JniLibrary<H> {
    type Runtime = JniRuntime;

    fn create(self, options: &BootstrapOptions) -> Result<(JniRuntime, JniEnv), BootstrapError> {
        let strings = c_options(options)?;
        let mut raw_options: Vec<JavaVMOption> = strings
            .iter()
            .map(|s| JavaVMOption {
                optionString: s.as_ptr().cast_mut(),
                extraInfo: ptr::null_mut(),
            })
            .collect();
        let mut args = JavaVMInitArgs {
            version: JNI_VERSION_1_4,
            nOptions: raw_options.len() as jint,
            options: raw_options.as_mut_ptr(),
            ignoreUnrecognized: JNI_FALSE,
        };

        let mut vm: *mut JavaVM = ptr::null_mut();
        let mut env: *mut c_void = ptr::null_mut();
        let code = unsafe {
            (self.create_vm)(
                &raw mut vm,
                &raw mut env,
                (&raw mut args).cast::<c_void>(),
            )
        };
        if code != JNI_OK || vm.is_null() || env.is_null() {
            tracing::error!(code, "{CREATE_SYMBOL} failed; keeping runtime library mapped");
            return Err(BootstrapError::CreationFailed { code });
        }

        let runtime = unsafe { JniRuntime::from_raw(vm) };
        let env = unsafe { JniEnv::from_raw(env.cast::<JNIEnv>()) };
        Ok((runtime, env))
    }
}
