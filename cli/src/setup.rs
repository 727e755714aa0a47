//! Process environment set up before anything else runs.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Make the executable's directory the working directory and return it.
///
/// Relative classpath entries, the config file, and the log file all
/// resolve against it.
pub fn enter_exe_dir() -> Result<PathBuf> {
    let exe = env::current_exe().context("failed to locate the running executable")?;
    let dir = exe
        .parent()
        .map(PathBuf::from)
        .context("executable path has no parent directory")?;
    env::set_current_dir(&dir)
        .with_context(|| format!("failed to change directory to {}", dir.display()))?;
    Ok(dir)
}

/// Enable `SeDebugPrivilege` on the process token if the account holds it.
pub fn enable_debug_privilege() {
    match platform::enable_debug_privilege() {
        Ok(true) => tracing::debug!("Debug privilege enabled"),
        Ok(false) => tracing::debug!("Debug privilege not held by this account"),
        Err(e) => tracing::warn!("Failed to enable debug privilege: {e:#}"),
    }
}

pub fn hide_console() {
    if platform::hide_console() {
        tracing::debug!("Console window hidden");
    }
}

#[cfg(windows)]
mod platform {
    use std::{io, mem, ptr};

    use anyhow::{Context, Result};
    use jhost_utils::{OwnedHandle, to_wide_null};
    use windows_sys::Win32::Foundation::{ERROR_NOT_ALL_ASSIGNED, GetLastError, HANDLE, LUID};
    use windows_sys::Win32::Security::{
        AdjustTokenPrivileges, LUID_AND_ATTRIBUTES, LookupPrivilegeValueW, SE_PRIVILEGE_ENABLED,
        TOKEN_ADJUST_PRIVILEGES, TOKEN_PRIVILEGES, TOKEN_QUERY,
    };
    use windows_sys::Win32::System::Console::GetConsoleWindow;
    use windows_sys::Win32::System::Threading::{GetCurrentProcess, OpenProcessToken};
    use windows_sys::Win32::UI::WindowsAndMessaging::{SW_HIDE, ShowWindow};

    const SE_DEBUG: &str = "SeDebugPrivilege";

    pub(super) fn enable_debug_privilege() -> Result<bool> {
        let mut raw: HANDLE = ptr::null_mut();
        if unsafe {
            OpenProcessToken(
                GetCurrentProcess(),
                TOKEN_ADJUST_PRIVILEGES | TOKEN_QUERY,
                &raw mut raw,
            )
        } == 0
        {
            return Err(io::Error::last_os_error()).context("OpenProcessToken failed");
        }
        let token = unsafe { OwnedHandle::from_raw(raw) };

        let name = to_wide_null(SE_DEBUG);
        let mut luid: LUID = unsafe { mem::zeroed() };
        if unsafe { LookupPrivilegeValueW(ptr::null(), name.as_ptr(), &raw mut luid) } == 0 {
            return Err(io::Error::last_os_error()).context("LookupPrivilegeValueW failed");
        }

        let privileges = TOKEN_PRIVILEGES {
            PrivilegeCount: 1,
            Privileges: [LUID_AND_ATTRIBUTES {
                Luid: luid,
                Attributes: SE_PRIVILEGE_ENABLED,
            }],
        };
        let adjusted = unsafe {
            AdjustTokenPrivileges(
                token.as_raw(),
                0,
                &raw const privileges,
                mem::size_of::<TOKEN_PRIVILEGES>() as u32,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if adjusted == 0 {
            return Err(io::Error::last_os_error()).context("AdjustTokenPrivileges failed");
        }
        Ok(unsafe { GetLastError() } != ERROR_NOT_ALL_ASSIGNED)
    }

    pub(super) fn hide_console() -> bool {
        let window = unsafe { GetConsoleWindow() };
        if window.is_null() {
            return false;
        }
        unsafe {
            let _ = ShowWindow(window, SW_HIDE);
        }
        true
    }
}

#[cfg(not(windows))]
mod platform {
    use anyhow::Result;

    pub(super) fn enable_debug_privilege() -> Result<bool> {
        Ok(false)
    }

    pub(super) fn hide_console() -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exe_dir_is_an_existing_directory() {
        let before = env::current_dir().unwrap();
        let dir = enter_exe_dir().unwrap();
        assert!(dir.is_dir());
        assert_eq!(env::current_dir().unwrap(), dir);
        env::set_current_dir(before).unwrap();
    }
}
