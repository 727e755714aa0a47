//! Shared test utilities and fixtures
//!
//! Registry layouts, runtime homes on disk, and launchers wired to the
//! in-memory runtime.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use jhost_core::testing::{MapRegistry, MockLoader, MockRuntime, RecordingSplash};
use jhost_core::{LaunchSettings, Launcher};
use jhost_types::{EntryPointDescriptor, RUNTIME_LIBRARY_NAME};

pub const JAVASOFT_ROOT: &str = r"SOFTWARE\JavaSoft\Java Runtime Environment";
pub const IBM_ROOT: &str = r"SOFTWARE\IBM\Java2 Runtime Environment";
pub const APP_CLASS: &str = "com/example/App";

/// Register `version` under `root` with `home` as its `JavaHome`.
pub fn register(registry: &mut MapRegistry, root: &str, version: &str, home: &Path) {
    registry.set(root, "CurrentVersion", version);
    registry.set(
        &format!(r"{root}\{version}"),
        "JavaHome",
        &home.to_string_lossy(),
    );
}

/// Lay out `home\bin\<flavor>\jvm.dll` for each flavor.
pub fn runtime_home(root: &Path, name: &str, flavors: &[&str]) -> PathBuf {
    let home = root.join(name);
    fs::create_dir_all(home.join("bin")).unwrap();
    for flavor in flavors {
        let dir = home.join("bin").join(flavor);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(RUNTIME_LIBRARY_NAME), b"MZ").unwrap();
    }
    home
}

/// Settings for fast tests: no splash delay, 1ms polls.
pub fn fast_settings() -> LaunchSettings {
    LaunchSettings {
        entry: EntryPointDescriptor::new(APP_CLASS),
        splash_grace: Duration::ZERO,
        poll_interval: Duration::from_millis(1),
        ..LaunchSettings::default()
    }
}

/// A runtime whose entry class has both `main` and `shutdown`.
pub fn app_runtime() -> MockRuntime {
    MockRuntime::default()
        .with_entry(APP_CLASS)
        .with_shutdown_hook(APP_CLASS)
}

pub struct Harness {
    pub launcher: Launcher<MapRegistry, MockLoader>,
    pub loader: MockLoader,
    pub splash: Arc<RecordingSplash>,
}

pub fn harness(registry: MapRegistry, runtime: MockRuntime, settings: LaunchSettings) -> Harness {
    let loader = MockLoader::new(runtime);
    let splash = Arc::new(RecordingSplash::default());
    let launcher = Launcher::new(registry, loader.clone(), settings, splash.clone());
    Harness {
        launcher,
        loader,
        splash,
    }
}
