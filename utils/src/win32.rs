//! Small Win32 helpers shared by the crates that call into the OS directly.

use std::ffi::OsStr;

/// Encode as a NUL-terminated UTF-16 string for `*W` Win32 APIs.
#[must_use]
pub fn to_wide_null(value: impl AsRef<OsStr>) -> Vec<u16> {
    #[cfg(windows)]
    {
        use std::os::windows::ffi::OsStrExt;
        let mut wide: Vec<u16> = value.as_ref().encode_wide().collect();
        wide.push(0);
        wide
    }
    #[cfg(not(windows))]
    {
        let mut wide: Vec<u16> = value.as_ref().to_string_lossy().encode_utf16().collect();
        wide.push(0);
        wide
    }
}

/// Decode a UTF-16 buffer up to the first NUL (or its end).
#[must_use]
pub fn from_wide_until_nul(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

/// Owned Win32 handle, closed on drop.
#[cfg(windows)]
pub struct OwnedHandle(windows_sys::Win32::Foundation::HANDLE);

#[cfg(windows)]
impl OwnedHandle {
    /// Take ownership of `raw`.
    ///
    /// # Safety
    /// `raw` must be a valid handle (or null) not owned elsewhere.
    #[must_use]
    pub unsafe fn from_raw(raw: windows_sys::Win32::Foundation::HANDLE) -> Self {
        Self(raw)
    }

    #[must_use]
    pub fn as_raw(&self) -> windows_sys::Win32::Foundation::HANDLE {
        self.0
    }
}

#[cfg(windows)]
impl Drop for OwnedHandle {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe {
                let _ = windows_sys::Win32::Foundation::CloseHandle(self.0);
            }
        }
    }
}
