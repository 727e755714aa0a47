//! In-memory stand-ins for the registry, the runtime library, and the splash.
//!
//! Compiled for this crate's unit tests and, behind the `testing` feature,
//! for the workspace integration tests.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use jhost_types::{
    BootstrapOptions, ENTRY_METHOD, ENTRY_SIGNATURE, RuntimeLibraryPath, SHUTDOWN_METHOD,
    SHUTDOWN_SIGNATURE,
};

use crate::collaborators::Splash;
use crate::errors::{AttachError, BootstrapError, MarshalError, RegistryError};
use crate::registry::RegistrySource;
use crate::runtime::{
    CallArgs, Fault, ManagedRuntime, RuntimeEnv, RuntimeLibrary, RuntimeLoader,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Registry backed by a map of `(key, value) -> data`.
#[derive(Debug, Default, Clone)]
pub struct MapRegistry {
    values: HashMap<String, HashMap<String, String>>,
}

impl MapRegistry {
    pub fn set(&mut self, key: &str, value: &str, data: &str) {
        self.values
            .entry(key.to_string())
            .or_default()
            .insert(value.to_string(), data.to_string());
    }
}

impl RegistrySource for MapRegistry {
    fn read_string(&self, key: &str, value: &str) -> Result<String, RegistryError> {
        let values = self.values.get(key).ok_or_else(|| RegistryError::KeyNotFound {
            key: key.to_string(),
        })?;
        values
            .get(value)
            .cloned()
            .ok_or_else(|| RegistryError::ValueNotFound {
                key: key.to_string(),
                value: value.to_string(),
            })
    }
}

/// A recorded static call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub class: String,
    pub method: String,
    pub args: Option<Vec<String>>,
}

/// Counters observed across every thread using a [`MockRuntime`].
#[derive(Debug, Clone, Default)]
pub struct RuntimeStats {
    pub attaches: usize,
    pub detaches: usize,
    pub calls: Vec<RecordedCall>,
    pub fault_checks: usize,
    pub faults_described: usize,
}

#[derive(Debug, Default)]
struct Shared {
    classes: Mutex<Vec<String>>,
    methods: Mutex<Vec<(usize, String, String)>>,
    call_fault: Mutex<Option<String>>,
    pending_fault: Mutex<Option<String>>,
    faults_on_check: Mutex<HashMap<usize, String>>,
    attach_failure: Mutex<Option<i32>>,
    stats: Mutex<RuntimeStats>,
    attached: AtomicI64,
}

/// Scriptable runtime. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRuntime {
    shared: Arc<Shared>,
}

impl MockRuntime {
    #[must_use]
    pub fn with_class(self, name: &str) -> Self {
        let mut classes = lock(&self.shared.classes);
        if !classes.iter().any(|c| c == name) {
            classes.push(name.to_string());
        }
        drop(classes);
        self
    }

    #[must_use]
    pub fn with_static_method(self, class: &str, name: &str, signature: &str) -> Self {
        let this = self.with_class(class);
        let index = lock(&this.shared.classes)
            .iter()
            .position(|c| c == class)
            .unwrap_or_default();
        lock(&this.shared.methods).push((index, name.to_string(), signature.to_string()));
        this
    }

    /// A class with `static void main(String[])`.
    #[must_use]
    pub fn with_entry(self, class: &str) -> Self {
        self.with_static_method(class, ENTRY_METHOD, ENTRY_SIGNATURE)
    }

    /// Add `static void shutdown()` to `class`.
    #[must_use]
    pub fn with_shutdown_hook(self, class: &str) -> Self {
        self.with_static_method(class, SHUTDOWN_METHOD, SHUTDOWN_SIGNATURE)
    }

    /// Every call leaves this fault pending.
    #[must_use]
    pub fn with_call_fault(self, description: &str) -> Self {
        *lock(&self.shared.call_fault) = Some(description.to_string());
        self
    }

    /// The `n`th fault check (1-based) reports a fault.
    #[must_use]
    pub fn with_fault_on_check(self, n: usize, description: &str) -> Self {
        lock(&self.shared.faults_on_check).insert(n, description.to_string());
        self
    }

    #[must_use]
    pub fn with_attach_failure(self, code: i32) -> Self {
        *lock(&self.shared.attach_failure) = Some(code);
        self
    }

    #[must_use]
    pub fn stats(&self) -> RuntimeStats {
        lock(&self.shared.stats).clone()
    }

    /// Threads currently attached through `attach_current_thread`.
    #[must_use]
    pub fn attached(&self) -> i64 {
        self.shared.attached.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn env(&self) -> MockEnv {
        MockEnv {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl ManagedRuntime for MockRuntime {
    type Env = MockEnv;

    fn attach_current_thread(&self) -> Result<MockEnv, AttachError> {
        if let Some(code) = *lock(&self.shared.attach_failure) {
            return Err(AttachError { code });
        }
        lock(&self.shared.stats).attaches += 1;
        self.shared.attached.fetch_add(1, Ordering::SeqCst);
        Ok(self.env())
    }

    fn detach_current_thread(&self) {
        lock(&self.shared.stats).detaches += 1;
        self.shared.attached.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Thread view of a [`MockRuntime`].
#[derive(Debug)]
pub struct MockEnv {
    shared: Arc<Shared>,
}

impl RuntimeEnv for MockEnv {
    type Class = usize;
    type Method = usize;

    fn find_class(&mut self, name: &str) -> Option<usize> {
        lock(&self.shared.classes).iter().position(|c| c == name)
    }

    fn find_static_method(&mut self, class: usize, name: &str, signature: &str) -> Option<usize> {
        lock(&self.shared.methods)
            .iter()
            .position(|(c, n, s)| *c == class && n == name && s == signature)
    }

    fn call_static_void(
        &mut self,
        class: usize,
        method: usize,
        args: CallArgs<'_>,
    ) -> Result<(), MarshalError> {
        let class_name = lock(&self.shared.classes)
            .get(class)
            .cloned()
            .ok_or_else(|| MarshalError(format!("stale class handle {class}")))?;
        let method_name = lock(&self.shared.methods)
            .get(method)
            .map(|(_, name, _)| name.clone())
            .ok_or_else(|| MarshalError(format!("stale method handle {method}")))?;
        let args = match args {
            CallArgs::None => None,
            CallArgs::Strings(values) => Some(values.to_vec()),
        };
        lock(&self.shared.stats).calls.push(RecordedCall {
            class: class_name,
            method: method_name,
            args,
        });
        if let Some(fault) = lock(&self.shared.call_fault).clone() {
            *lock(&self.shared.pending_fault) = Some(fault);
        }
        Ok(())
    }

    fn take_fault(&mut self) -> Option<Fault> {
        let check = {
            let mut stats = lock(&self.shared.stats);
            stats.fault_checks += 1;
            stats.fault_checks
        };
        let fault = lock(&self.shared.pending_fault)
            .take()
            .or_else(|| lock(&self.shared.faults_on_check).remove(&check))?;
        lock(&self.shared.stats).faults_described += 1;
        Some(Fault::new(fault))
    }
}

/// How a [`MockLoader`]'s load or create step should fail.
#[derive(Debug, Clone, Default)]
pub enum LoaderFailure {
    #[default]
    None,
    Load(String),
    MissingSymbol,
    Creation(i32),
}

#[derive(Debug, Default)]
struct LoaderLog {
    restricted: Vec<PathBuf>,
    loaded: Vec<PathBuf>,
    created_with: Vec<Vec<String>>,
}

/// Loader that hands out a [`MockRuntime`].
#[derive(Debug, Clone, Default)]
pub struct MockLoader {
    runtime: MockRuntime,
    failure: LoaderFailure,
    log: Arc<Mutex<LoaderLog>>,
}

impl MockLoader {
    #[must_use]
    pub fn new(runtime: MockRuntime) -> Self {
        Self {
            runtime,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing(mut self, failure: LoaderFailure) -> Self {
        self.failure = failure;
        self
    }

    #[must_use]
    pub fn runtime(&self) -> &MockRuntime {
        &self.runtime
    }

    #[must_use]
    pub fn restricted_dirs(&self) -> Vec<PathBuf> {
        lock(&self.log).restricted.clone()
    }

    #[must_use]
    pub fn loaded(&self) -> Vec<PathBuf> {
        lock(&self.log).loaded.clone()
    }

    /// Option lists passed to every creation attempt.
    #[must_use]
    pub fn creations(&self) -> Vec<Vec<String>> {
        lock(&self.log).created_with.clone()
    }
}

pub struct MockLibrary {
    loader: MockLoader,
}

impl RuntimeLoader for MockLoader {
    type Library = MockLibrary;

    fn restrict_search_path(&self, dir: &Path) -> io::Result<()> {
        lock(&self.log).restricted.push(dir.to_path_buf());
        Ok(())
    }

    fn load(&self, path: &RuntimeLibraryPath) -> Result<MockLibrary, BootstrapError> {
        lock(&self.log).loaded.push(path.as_path().to_path_buf());
        match &self.failure {
            LoaderFailure::Load(reason) => Err(BootstrapError::LoadFailed {
                path: path.as_path().to_path_buf(),
                reason: reason.clone(),
            }),
            LoaderFailure::MissingSymbol => Err(BootstrapError::MissingCreateSymbol {
                path: path.as_path().to_path_buf(),
                symbol: "JNI_CreateJavaVM",
            }),
            LoaderFailure::None | LoaderFailure::Creation(_) => Ok(MockLibrary {
                loader: self.clone(),
            }),
        }
    }
}

impl RuntimeLibrary for MockLibrary {
    type Runtime = MockRuntime;

    fn create(self, options: &BootstrapOptions) -> Result<(MockRuntime, MockEnv), BootstrapError> {
        lock(&self.loader.log)
            .created_with
            .push(options.as_slice().to_vec());
        if let LoaderFailure::Creation(code) = self.loader.failure {
            return Err(BootstrapError::CreationFailed { code });
        }
        let runtime = self.loader.runtime.clone();
        let env = runtime.env();
        Ok((runtime, env))
    }
}

/// Splash that counts show/close signals.
#[derive(Debug, Default)]
pub struct RecordingSplash {
    shows: AtomicUsize,
    closes: AtomicUsize,
}

impl RecordingSplash {
    #[must_use]
    pub fn shows(&self) -> usize {
        self.shows.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Splash for RecordingSplash {
    fn show(&self) {
        self.shows.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}
