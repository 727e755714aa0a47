//! Configuration file to launch settings to the runtime's creation options.

use std::fs;

use jhost_config::LauncherConfig;
use jhost_core::testing::MapRegistry;
use jhost_core::{LaunchSettings, stop_channel};
use jhost_types::RuntimeVendor;
use tempfile::tempdir;

use crate::common::{app_runtime, harness, runtime_home};

#[test]
fn configured_launch_skips_registry_and_passes_options_in_order() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["server"]);
    fs::write(
        LauncherConfig::path_in(dir.path()),
        format!(
            r#"
[launcher]
entry_class = "com.example.App"
classpath = ["a.jar", "lib/b.jar", "a.jar"]
options = ["-Xmx256m", "-Djava.library.path=."]
poll_interval_ms = 1
splash_grace_ms = 0

[runtime]
java_home = '{}'
"#,
            home.display()
        ),
    )
    .unwrap();

    let (config, err) = LauncherConfig::load_or_default(dir.path());
    assert!(err.is_none(), "{err:?}");
    let settings = LaunchSettings::from_config(&config);
    let h = harness(MapRegistry::default(), app_runtime(), settings);

    let (install, _) = h.launcher.discover().unwrap();
    assert_eq!(install.vendor(), RuntimeVendor::Configured);

    let (handle, stop) = stop_channel();
    handle.stop();
    h.launcher.run(|_| {}, &stop).unwrap();
    assert_eq!(
        h.loader.creations(),
        vec![vec![
            "-Djava.class.path=a.jar;lib/b.jar;a.jar;".to_string(),
            "-Xmx256m".to_string(),
            "-Djava.library.path=.".to_string(),
        ]]
    );
}

#[test]
fn broken_config_falls_back_to_stock_settings() {
    let dir = tempdir().unwrap();
    fs::write(LauncherConfig::path_in(dir.path()), "[launcher]\npoll_interval_ms = \"soon\"\n")
        .unwrap();

    let (config, err) = LauncherConfig::load_or_default(dir.path());
    assert!(err.is_some());
    let settings = LaunchSettings::from_config(&config);
    assert_eq!(settings.classpath, vec!["va.Jar".to_string()]);
    assert_eq!(settings.entry.class_name(), "com/guardium/gui/AppMain");
}
