//! The shutdown path running on its own thread while the launch supervises.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use jhost_core::testing::{MapRegistry, MockRuntime};
use jhost_core::{ShutdownOutcome, shutdown, stop_channel};
use jhost_types::EntryPointDescriptor;
use tempfile::tempdir;

use crate::common::{
    APP_CLASS, JAVASOFT_ROOT, app_runtime, fast_settings, harness, register, runtime_home,
};

fn supervise_then_shut_down(runtime: MockRuntime) -> ShutdownOutcome {
    let dir = tempdir().unwrap();
    let home = runtime_home(dir.path(), "jre", &["client"]);
    let mut registry = MapRegistry::default();
    register(&mut registry, JAVASOFT_ROOT, "1.8", &home);
    let h = harness(registry, runtime, fast_settings());

    let (handle, stop) = stop_channel();
    let (booted_tx, booted_rx) = mpsc::channel::<Arc<MockRuntime>>();

    thread::scope(|scope| {
        let host = scope.spawn(move || {
            h.launcher.run(
                move |runtime| {
                    let _ = booted_tx.send(Arc::clone(runtime));
                },
                &stop,
            )
        });

        let runtime = booted_rx.recv().unwrap();
        let outcome = shutdown(&*runtime, &EntryPointDescriptor::new(APP_CLASS)).unwrap();
        handle.stop();

        let report = host.join().unwrap().unwrap();
        assert!(report.polls >= 1);
        outcome
    })
}

#[test]
fn shutdown_hook_is_called_while_supervising() {
    let runtime = app_runtime();
    let outcome = supervise_then_shut_down(runtime.clone());
    assert_eq!(outcome, ShutdownOutcome::Graceful);

    let stats = runtime.stats();
    let methods: Vec<_> = stats.calls.iter().map(|c| c.method.as_str()).collect();
    assert!(methods.contains(&"main"));
    assert!(methods.contains(&"shutdown"));
    assert_eq!(stats.attaches, 1);
    assert_eq!(stats.detaches, 1);
    assert_eq!(runtime.attached(), 0);
}

#[test]
fn missing_hook_still_stops_cleanly() {
    let runtime = MockRuntime::default().with_entry(APP_CLASS);
    let outcome = supervise_then_shut_down(runtime.clone());
    assert_eq!(outcome, ShutdownOutcome::NoShutdownHook);
    assert_eq!(runtime.stats().detaches, 1);
}
