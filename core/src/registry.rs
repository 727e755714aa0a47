//! Boundary: read-only access to the installation registry.
//!
//! Discovery only ever reads string values under `HKEY_LOCAL_MACHINE`; the
//! [`RegistrySource`] trait is that one operation, so tests can substitute an
//! in-memory registry.

use crate::errors::RegistryError;

/// Value naming the installed version under a vendor root.
pub const CURRENT_VERSION_VALUE: &str = "CurrentVersion";
/// Value naming the installation directory under `<root>\<version>`.
pub const JAVA_HOME_VALUE: &str = "JavaHome";
/// Value naming the runtime library under `<root>\<version>`.
pub const RUNTIME_LIB_VALUE: &str = "RuntimeLib";

pub trait RegistrySource {
    /// Read the string `value` under `HKEY_LOCAL_MACHINE\key`.
    fn read_string(&self, key: &str, value: &str) -> Result<String, RegistryError>;
}

impl<T: RegistrySource + ?Sized> RegistrySource for &T {
    fn read_string(&self, key: &str, value: &str) -> Result<String, RegistryError> {
        (**self).read_string(key, value)
    }
}

/// The host machine's registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostRegistry;

impl HostRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(windows)]
mod host {
    use std::ptr;

    use jhost_utils::{from_wide_until_nul, to_wide_null};
    use windows_sys::Win32::Foundation::{ERROR_FILE_NOT_FOUND, ERROR_MORE_DATA, ERROR_SUCCESS};
    use windows_sys::Win32::System::Registry::{
        HKEY, HKEY_LOCAL_MACHINE, KEY_READ, RRF_RT_REG_SZ, RegCloseKey, RegGetValueW,
        RegOpenKeyExW,
    };

    use super::{HostRegistry, RegistrySource};
    use crate::errors::RegistryError;

    struct OpenKey(HKEY);

    impl Drop for OpenKey {
        fn drop(&mut self) {
            unsafe {
                let _ = RegCloseKey(self.0);
            }
        }
    }

    fn open_key(key: &str) -> Result<OpenKey, RegistryError> {
        let wide_key = to_wide_null(key);
        let mut raw: HKEY = ptr::null_mut();
        let status =
            unsafe { RegOpenKeyExW(HKEY_LOCAL_MACHINE, wide_key.as_ptr(), 0, KEY_READ, &raw mut raw) };
        match status {
            ERROR_SUCCESS => Ok(OpenKey(raw)),
            ERROR_FILE_NOT_FOUND => Err(RegistryError::KeyNotFound {
                key: key.to_string(),
            }),
            code => Err(RegistryError::Os {
                key: key.to_string(),
                value: String::new(),
                code,
            }),
        }
    }

    impl RegistrySource for HostRegistry {
        fn read_string(&self, key: &str, value: &str) -> Result<String, RegistryError> {
            let open = open_key(key)?;
            let wide_value = to_wide_null(value);
            let value_error = |code: u32| {
                if code == ERROR_FILE_NOT_FOUND {
                    RegistryError::ValueNotFound {
                        key: key.to_string(),
                        value: value.to_string(),
                    }
                } else {
                    RegistryError::Os {
                        key: key.to_string(),
                        value: value.to_string(),
                        code,
                    }
                }
            };

            // The value may grow between the size query and the read; retry on MORE_DATA.
            loop {
                let mut needed: u32 = 0;
                let status = unsafe {
                    RegGetValueW(
                        open.0,
                        ptr::null(),
                        wide_value.as_ptr(),
                        RRF_RT_REG_SZ,
                        ptr::null_mut(),
                        ptr::null_mut(),
                        &raw mut needed,
                    )
                };
                if status != ERROR_SUCCESS {
                    return Err(value_error(status));
                }

                let mut buf = vec![0u16; (needed as usize).div_ceil(2) + 1];
                let mut len = (buf.len() * 2) as u32;
                let status = unsafe {
                    RegGetValueW(
                        open.0,
                        ptr::null(),
                        wide_value.as_ptr(),
                        RRF_RT_REG_SZ,
                        ptr::null_mut(),
                        buf.as_mut_ptr().cast(),
                        &raw mut len,
                    )
                };
                match status {
                    ERROR_SUCCESS => return Ok(from_wide_until_nul(&buf)),
                    ERROR_MORE_DATA => {}
                    code => return Err(value_error(code)),
                }
            }
        }
    }
}

/// Off Windows there is no installation registry; every key is absent.
#[cfg(not(windows))]
impl RegistrySource for HostRegistry {
    fn read_string(&self, key: &str, _value: &str) -> Result<String, RegistryError> {
        Err(RegistryError::KeyNotFound {
            key: key.to_string(),
        })
    }
}
