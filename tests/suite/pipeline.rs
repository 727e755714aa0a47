//! The whole launch on one thread: discover, boot, enter, supervise.

use std::sync::Arc;

use jhost_core::testing::{LoaderFailure, MapRegistry, MockLoader, MockRuntime, RecordingSplash};
use jhost_core::{FailureCategory, LaunchError, Launcher, stop_channel};
use tempfile::tempdir;

use crate::common::{
    APP_CLASS, JAVASOFT_ROOT, app_runtime, fast_settings, harness, register, runtime_home,
};

fn registry_for(home: &std::path::Path) -> MapRegistry {
    let mut registry = MapRegistry::default();
    register(&mut registry, JAVASOFT_ROOT, "1.8", home);
    registry
}

#[test]
fn launch_boots_enters_and_supervises() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["client"]);
    // Check 1 follows `main`; check 2 is the supervisor's first poll.
    let runtime = app_runtime().with_fault_on_check(2, "java.lang.OutOfMemoryError: worker");
    let h = harness(registry_for(&home), runtime.clone(), fast_settings());

    let (handle, stop) = stop_channel();
    handle.stop();
    let report = h.launcher.run(|_| {}, &stop).unwrap();

    assert_eq!(report.polls, 1);
    assert_eq!(report.faults, 1);
    assert_eq!(h.loader.restricted_dirs(), vec![home.join("bin")]);
    assert_eq!(
        h.loader.creations(),
        vec![vec![
            "-Djava.class.path=va.Jar;".to_string(),
            "-Djava.library.path=.".to_string(),
        ]]
    );

    let calls = runtime.stats().calls;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].class, APP_CLASS);
    assert_eq!(calls[0].method, "main");
    assert_eq!(
        calls[0].args,
        Some(vec!["DISCOVERY_SCAN_INTERVAL=1440".to_string()])
    );
    assert_eq!(h.splash.shows(), 1);
    assert_eq!(h.splash.closes(), 1);
}

#[test]
fn runtime_is_published_before_the_entry_point_runs() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["server"]);
    let runtime = app_runtime();
    let h = harness(registry_for(&home), runtime.clone(), fast_settings());

    let (handle, stop) = stop_channel();
    handle.stop();
    let mut calls_at_boot = None;
    h.launcher
        .run(|booted| calls_at_boot = Some(booted.stats().calls.len()), &stop)
        .unwrap();
    assert_eq!(calls_at_boot, Some(0));
    assert_eq!(runtime.stats().calls.len(), 1);
}

#[test]
fn missing_entry_class_is_a_packaging_failure() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["client"]);
    let runtime = MockRuntime::default();
    let h = harness(registry_for(&home), runtime.clone(), fast_settings());

    let (_handle, stop) = stop_channel();
    let err = h.launcher.run(|_| {}, &stop).unwrap_err();
    assert_eq!(err.category(), FailureCategory::EntryPoint);
    assert_eq!(runtime.stats().fault_checks, 0);
    assert_eq!(h.splash.closes(), 1);
}

#[test]
fn loader_failures_map_to_load_and_init() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["client"]);
    let cases = [
        (LoaderFailure::Load("os error 193".into()), FailureCategory::Load),
        (LoaderFailure::MissingSymbol, FailureCategory::Load),
        (LoaderFailure::Creation(-1), FailureCategory::Init),
    ];

    for (failure, expected) in cases {
        let loader = MockLoader::new(app_runtime()).failing(failure.clone());
        let launcher = Launcher::new(
            registry_for(&home),
            loader.clone(),
            fast_settings(),
            Arc::new(RecordingSplash::default()),
        );
        let (_handle, stop) = stop_channel();
        let err = launcher.run(|_| {}, &stop).unwrap_err();
        assert!(matches!(err, LaunchError::Bootstrap(_)), "{failure:?}");
        assert_eq!(err.category(), expected, "{failure:?}");
        assert!(loader.runtime().stats().calls.is_empty());
    }
}

#[test]
fn empty_classpath_is_an_init_failure_before_creation() {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["client"]);
    let mut settings = fast_settings();
    settings.classpath.clear();
    let h = harness(registry_for(&home), app_runtime(), settings);

    let (_handle, stop) = stop_channel();
    let err = h.launcher.run(|_| {}, &stop).unwrap_err();
    assert_eq!(err.category(), FailureCategory::Init);
    assert!(h.loader.creations().is_empty());
}
