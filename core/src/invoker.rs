//! Entry-Point Invoker: run the application's `main` on the creating thread.

use std::thread;
use std::time::Duration;

use jhost_types::{ApplicationArguments, EntryPointDescriptor};

use crate::collaborators::Splash;
use crate::errors::InvokeError;
use crate::runtime::{CallArgs, RuntimeEnv};

/// Resolve and call the entry point, then check for an uncaught fault.
///
/// The call may block for as long as the application's `main` runs. Once
/// it returns, the splash is closed after `splash_grace`, whatever the
/// outcome of the call.
pub fn invoke<E: RuntimeEnv>(
    env: &mut E,
    entry: &EntryPointDescriptor,
    args: &ApplicationArguments,
    splash: &dyn Splash,
    splash_grace: Duration,
) -> Result<(), InvokeError> {
    let class_name = entry.class_name();
    let Some(class) = env.find_class(class_name) else {
        tracing::error!(class = class_name, "Can't find entry class");
        return Err(InvokeError::ClassNotFound {
            class: class_name.to_string(),
        });
    };
    tracing::debug!(class = class_name, "Found entry class");

    let Some(method) = env.find_static_method(class, entry.method_name(), entry.signature()) else {
        tracing::error!(
            class = class_name,
            method = entry.method_name(),
            "Can't find entry method"
        );
        return Err(InvokeError::EntryPointNotFound {
            class: class_name.to_string(),
            method: entry.method_name(),
            signature: entry.signature(),
        });
    };

    tracing::info!(class = class_name, args = args.len(), "Calling entry point");
    let called = env.call_static_void(class, method, CallArgs::Strings(args.as_slice()));
    tracing::info!(class = class_name, "Entry point returned");

    thread::sleep(splash_grace);
    splash.close();

    called?;
    if let Some(fault) = env.take_fault() {
        tracing::error!(
            class = class_name,
            fault = fault.description(),
            "Uncaught fault during entry point"
        );
        return Err(InvokeError::UncaughtFault {
            description: fault.description().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockRuntime, RecordingSplash};

    const APP: &str = "com/example/App";

    fn args() -> ApplicationArguments {
        ApplicationArguments::new().param("A", 1).param("B", "two")
    }

    #[test]
    fn calls_main_with_ordered_args_and_closes_splash() {
        let runtime = MockRuntime::default().with_entry(APP);
        let splash = RecordingSplash::default();
        let entry = EntryPointDescriptor::new("com.example.App");

        invoke(&mut runtime.env(), &entry, &args(), &splash, Duration::ZERO).unwrap();

        let calls = runtime.stats().calls;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].class, APP);
        assert_eq!(calls[0].method, "main");
        assert_eq!(
            calls[0].args.as_deref(),
            Some(&["A=1".to_string(), "B=two".to_string()][..])
        );
        assert_eq!(splash.closes(), 1);
    }

    #[test]
    fn missing_class_is_not_found_and_makes_no_call() {
        let runtime = MockRuntime::default();
        let splash = RecordingSplash::default();
        let err = invoke(
            &mut runtime.env(),
            &EntryPointDescriptor::new(APP),
            &args(),
            &splash,
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, InvokeError::ClassNotFound { class } if class == APP));
        assert!(runtime.stats().calls.is_empty());
    }

    #[test]
    fn class_without_main_is_entry_point_not_found() {
        let runtime = MockRuntime::default().with_shutdown_hook(APP);
        let splash = RecordingSplash::default();
        let err = invoke(
            &mut runtime.env(),
            &EntryPointDescriptor::new(APP),
            &args(),
            &splash,
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, InvokeError::EntryPointNotFound { method: "main", .. }));
    }

    #[test]
    fn fault_raised_by_main_is_reported_after_splash_closes() {
        let runtime = MockRuntime::default()
            .with_entry(APP)
            .with_call_fault("java.lang.IllegalStateException: boom");
        let splash = RecordingSplash::default();
        let err = invoke(
            &mut runtime.env(),
            &EntryPointDescriptor::new(APP),
            &args(),
            &splash,
            Duration::ZERO,
        )
        .unwrap_err();
        match err {
            InvokeError::UncaughtFault { description } => {
                assert!(description.contains("IllegalStateException"));
            }
            other => panic!("expected UncaughtFault, got {other:?}"),
        }
        assert_eq!(splash.closes(), 1);
        assert_eq!(runtime.stats().faults_described, 1);
    }
}
