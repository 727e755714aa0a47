//! The launch context: one per process, threaded through every stage.
//!
//! ```text
//! discover ──> boot ──> enter ──> supervise
//!  (locate,     (load,    (main)    (poll until stopped)
//!   resolve)     create)
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use jhost_config::LauncherConfig;
use jhost_types::{
    ApplicationArguments, EntryPointDescriptor, RuntimeInstallation, RuntimeLibraryPath,
};

use crate::bootstrap::{Bootstrapped, bootstrap};
use crate::collaborators::Splash;
use crate::errors::LaunchError;
use crate::invoker::invoke;
use crate::locator::locate;
use crate::registry::RegistrySource;
use crate::resolver::resolve;
use crate::runtime::{EnvOf, RuntimeLoader, RuntimeOf};
use crate::supervisor::{StopSignal, Supervisor, SupervisorReport};

/// Everything a launch needs to know, resolved from configuration.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    pub entry: EntryPointDescriptor,
    pub classpath: Vec<String>,
    pub options: Vec<String>,
    pub arguments: ApplicationArguments,
    /// Skip registry discovery and use this home.
    pub java_home: Option<PathBuf>,
    /// Load this library without resolving one.
    pub runtime_lib: Option<PathBuf>,
    pub poll_interval: Duration,
    pub splash_grace: Duration,
}

impl LaunchSettings {
    #[must_use]
    pub fn from_config(config: &LauncherConfig) -> Self {
        Self {
            entry: config.launcher.entry_point(),
            classpath: config.launcher.classpath.clone(),
            options: config.launcher.options.clone(),
            arguments: ApplicationArguments::launch_defaults(),
            java_home: config.runtime.java_home(),
            runtime_lib: config.runtime.runtime_lib(),
            poll_interval: config.launcher.poll_interval(),
            splash_grace: config.launcher.splash_grace(),
        }
    }
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self::from_config(&LauncherConfig::default())
    }
}

pub struct Launcher<G, L> {
    registry: G,
    loader: L,
    settings: LaunchSettings,
    splash: Arc<dyn Splash>,
}

impl<G: RegistrySource, L: RuntimeLoader> Launcher<G, L> {
    pub fn new(registry: G, loader: L, settings: LaunchSettings, splash: Arc<dyn Splash>) -> Self {
        Self {
            registry,
            loader,
            settings,
            splash,
        }
    }

    /// Locate the installation and resolve its library, honoring overrides.
    pub fn discover(&self) -> Result<(RuntimeInstallation, RuntimeLibraryPath), LaunchError> {
        let installation = match &self.settings.java_home {
            Some(home) => {
                tracing::info!(home = %home.display(), "Using configured runtime home");
                RuntimeInstallation::configured(home.clone())
            }
            None => locate(&self.registry)?,
        };

        let library = match &self.settings.runtime_lib {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using configured runtime library");
                RuntimeLibraryPath::new(path.clone())
            }
            None => resolve(&self.registry, &installation)?,
        };
        tracing::info!(
            vendor = %installation.vendor(),
            version = installation.version(),
            home = %installation.home().display(),
            library = %library,
            "Runtime selected"
        );
        Ok((installation, library))
    }

    pub fn boot(
        &self,
        installation: &RuntimeInstallation,
        library: &RuntimeLibraryPath,
    ) -> Result<Bootstrapped<RuntimeOf<L>>, LaunchError> {
        Ok(bootstrap(
            &self.loader,
            installation,
            library,
            &self.settings.classpath,
            &self.settings.options,
        )?)
    }

    /// Run the entry point on the creating thread's environment.
    pub fn enter(&self, env: &mut EnvOf<RuntimeOf<L>>) -> Result<(), LaunchError> {
        Ok(invoke(
            env,
            &self.settings.entry,
            &self.settings.arguments,
            self.splash.as_ref(),
            self.settings.splash_grace,
        )?)
    }

    /// The whole launch on the calling thread.
    ///
    /// `on_boot` receives the runtime as soon as it exists, before the entry
    /// point runs, so a stop hook can reach it concurrently. Returns once
    /// `stop` fires.
    pub fn run<F>(&self, on_boot: F, stop: &StopSignal) -> Result<SupervisorReport, LaunchError>
    where
        F: FnOnce(&Arc<RuntimeOf<L>>),
    {
        self.splash.show();
        let result = self.start(on_boot).map(|env| {
            Supervisor::new(env, self.settings.poll_interval).run(stop)
        });
        if let Err(e) = &result {
            tracing::error!(category = e.category().label(), "Launch failed: {e}");
            self.splash.close();
        }
        result
    }

    fn start<F>(&self, on_boot: F) -> Result<EnvOf<RuntimeOf<L>>, LaunchError>
    where
        F: FnOnce(&Arc<RuntimeOf<L>>),
    {
        let (installation, library) = self.discover()?;
        let Bootstrapped { runtime, mut env } = self.boot(&installation, &library)?;
        on_boot(&runtime);
        self.enter(&mut env)?;
        Ok(env)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use jhost_types::{RUNTIME_LIBRARY_NAME, RuntimeVendor};

    use super::*;
    use crate::errors::{FailureCategory, LocateError};
    use crate::supervisor::stop_channel;
    use crate::testing::{MapRegistry, MockLoader, MockRuntime, RecordingSplash};

    fn settings() -> LaunchSettings {
        LaunchSettings {
            entry: EntryPointDescriptor::new("com/example/App"),
            splash_grace: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            ..LaunchSettings::default()
        }
    }

    #[test]
    fn defaults_match_the_shipped_application() {
        let settings = LaunchSettings::default();
        assert_eq!(settings.entry.class_name(), "com/guardium/gui/AppMain");
        assert_eq!(settings.classpath, vec!["va.Jar".to_string()]);
        assert_eq!(settings.options, vec!["-Djava.library.path=.".to_string()]);
        assert_eq!(
            settings.arguments.as_slice(),
            &["DISCOVERY_SCAN_INTERVAL=1440".to_string()]
        );
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn java_home_override_skips_registry() {
        let dir = tempfile::tempdir().unwrap();
        let client = dir.path().join("bin").join("client");
        fs::create_dir_all(&client).unwrap();
        fs::write(client.join(RUNTIME_LIBRARY_NAME), b"MZ").unwrap();

        let launcher = Launcher::new(
            MapRegistry::default(),
            MockLoader::default(),
            LaunchSettings {
                java_home: Some(dir.path().to_path_buf()),
                ..settings()
            },
            Arc::new(RecordingSplash::default()),
        );
        let (install, library) = launcher.discover().unwrap();
        assert_eq!(install.vendor(), RuntimeVendor::Configured);
        assert_eq!(library.as_path(), client.join(RUNTIME_LIBRARY_NAME));
    }

    #[test]
    fn runtime_lib_override_is_used_verbatim() {
        let launcher = Launcher::new(
            MapRegistry::default(),
            MockLoader::default(),
            LaunchSettings {
                java_home: Some(PathBuf::from(r"C:\nowhere")),
                runtime_lib: Some(PathBuf::from(r"C:\nowhere\jvm.dll")),
                ..settings()
            },
            Arc::new(RecordingSplash::default()),
        );
        let (_, library) = launcher.discover().unwrap();
        assert_eq!(library.as_path(), PathBuf::from(r"C:\nowhere\jvm.dll"));
    }

    #[test]
    fn discovery_failure_never_boots_and_closes_splash() {
        let loader = MockLoader::default();
        let splash = Arc::new(RecordingSplash::default());
        let launcher = Launcher::new(
            MapRegistry::default(),
            loader.clone(),
            settings(),
            splash.clone(),
        );
        let (_handle, stop) = stop_channel();
        let mut booted = false;

        let err = launcher.run(|_| booted = true, &stop).unwrap_err();
        assert!(matches!(err, LaunchError::Locate(LocateError::NotInstalled)));
        assert_eq!(err.category(), FailureCategory::Discovery);
        assert!(!booted);
        assert!(loader.loaded().is_empty());
        assert_eq!(splash.shows(), 1);
        assert_eq!(splash.closes(), 1);
    }

    #[test]
    fn entry_fault_is_a_runtime_fault_failure() {
        let runtime = MockRuntime::default()
            .with_entry("com/example/App")
            .with_call_fault("java.lang.RuntimeException: no config");
        let launcher = Launcher::new(
            MapRegistry::default(),
            MockLoader::new(runtime),
            LaunchSettings {
                java_home: Some(PathBuf::from(r"C:\jre")),
                runtime_lib: Some(PathBuf::from(r"C:\jre\bin\server\jvm.dll")),
                ..settings()
            },
            Arc::new(RecordingSplash::default()),
        );
        let (_handle, stop) = stop_channel();
        let err = launcher.run(|_| {}, &stop).unwrap_err();
        assert_eq!(err.category(), FailureCategory::RuntimeFault);
    }
}
