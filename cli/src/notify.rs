//! The one blocking notification shown when a launch cannot proceed.

use jhost_core::{FailureCategory, LaunchError};

/// Title and body for a fatal launch failure, or `None` when the failure is
/// only written to the log.
#[must_use]
pub fn message_for(category: FailureCategory) -> Option<(&'static str, &'static str)> {
    match category {
        FailureCategory::Discovery => Some((
            "No 64 bit Java installed",
            "Can not find any installed 64 bit Java\nPlease install a 64 bit Java and try again",
        )),
        FailureCategory::Load => Some((
            "Java could not be loaded",
            "The installed Java runtime could not be loaded.\n\
             Please reinstall a 64 bit Java and try again",
        )),
        FailureCategory::Init => Some((
            "Java failed to start",
            "The Java runtime rejected its startup options.\nSee Va.log for details",
        )),
        FailureCategory::EntryPoint => Some((
            "Application is damaged",
            "The application's main class could not be found.\nPlease reinstall the application",
        )),
        FailureCategory::RuntimeFault => None,
    }
}

/// Tell the user which prerequisite is missing. Blocks until dismissed.
pub fn fatal(error: &LaunchError) {
    let category = error.category();
    let Some((title, body)) = message_for(category) else {
        return;
    };
    tracing::info!(category = category.label(), "Notifying user of fatal launch failure");
    show(title, body);
}

#[cfg(windows)]
fn show(title: &str, body: &str) {
    use std::ptr;

    use jhost_utils::to_wide_null;
    use windows_sys::Win32::UI::WindowsAndMessaging::{MB_ICONERROR, MB_OK, MessageBoxW};

    let title = to_wide_null(title);
    let body = to_wide_null(body);
    unsafe {
        let _ = MessageBoxW(
            ptr::null_mut(),
            body.as_ptr(),
            title.as_ptr(),
            MB_OK | MB_ICONERROR,
        );
    }
}

#[cfg(not(windows))]
fn show(title: &str, body: &str) {
    eprintln!("{title}: {body}");
}
