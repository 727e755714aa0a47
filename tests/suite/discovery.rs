//! Discovery through the launcher: registry, vendor selection, and the
//! library fallback chain against real directories.

use jhost_core::testing::{MapRegistry, MockRuntime};
use jhost_core::{FailureCategory, LaunchError, LocateError, ResolveError, stop_channel};
use jhost_types::{RUNTIME_LIBRARY_NAME, RuntimeVendor};
use tempfile::tempdir;

use crate::common::{IBM_ROOT, JAVASOFT_ROOT, fast_settings, harness, register, runtime_home};

#[test]
fn newest_vendor_and_its_first_probed_flavor_are_selected() {
    let dir = tempdir().unwrap();
    let old = runtime_home(dir.path(), "javasoft", &["client"]);
    let new = runtime_home(dir.path(), "ibm", &["server"]);

    let mut registry = MapRegistry::default();
    register(&mut registry, JAVASOFT_ROOT, "1.7", &old);
    register(&mut registry, IBM_ROOT, "1.8", &new);

    let h = harness(registry, MockRuntime::default(), fast_settings());
    let (install, library) = h.launcher.discover().unwrap();
    assert_eq!(install.vendor(), RuntimeVendor::Ibm);
    assert_eq!(install.version(), "1.8");
    assert_eq!(
        library.as_path(),
        new.join("bin").join("server").join(RUNTIME_LIBRARY_NAME)
    );
}

#[test]
fn client_flavor_is_preferred_when_both_exist() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["server", "client"]);
    let mut registry = MapRegistry::default();
    register(&mut registry, JAVASOFT_ROOT, "1.8", &home);

    let h = harness(registry, MockRuntime::default(), fast_settings());
    let (_, library) = h.launcher.discover().unwrap();
    assert_eq!(
        library.as_path(),
        home.join("bin").join("client").join(RUNTIME_LIBRARY_NAME)
    );
}

#[test]
fn registry_runtime_lib_is_taken_verbatim() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["client"]);
    let mut registry = MapRegistry::default();
    register(&mut registry, JAVASOFT_ROOT, "1.8", &home);
    registry.set(
        &format!(r"{JAVASOFT_ROOT}\1.8"),
        "RuntimeLib",
        r"E:\custom\jvm.dll",
    );

    let h = harness(registry, MockRuntime::default(), fast_settings());
    let (_, library) = h.launcher.discover().unwrap();
    assert_eq!(library.to_string(), r"E:\custom\jvm.dll");
}

#[test]
fn no_vendor_fails_discovery_without_loading() {
    let h = harness(
        MapRegistry::default(),
        MockRuntime::default(),
        fast_settings(),
    );
    let (_handle, stop) = stop_channel();
    let err = h.launcher.run(|_| {}, &stop).unwrap_err();
    assert!(matches!(err, LaunchError::Locate(LocateError::NotInstalled)));
    assert_eq!(err.category(), FailureCategory::Discovery);
    assert!(h.loader.loaded().is_empty());
    assert!(h.loader.creations().is_empty());
}

#[test]
fn installation_without_library_fails_discovery() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &[]);
    let mut registry = MapRegistry::default();
    register(&mut registry, IBM_ROOT, "1.6", &home);

    let h = harness(registry, MockRuntime::default(), fast_settings());
    let (_handle, stop) = stop_channel();
    let err = h.launcher.run(|_| {}, &stop).unwrap_err();
    assert!(matches!(err, LaunchError::Resolve(ResolveError::NotFound { .. })));
    assert_eq!(err.category(), FailureCategory::Discovery);
    assert!(h.loader.loaded().is_empty());
    assert_eq!(h.splash.closes(), 1);
}
