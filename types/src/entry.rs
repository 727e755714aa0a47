//! Entry point description and launch arguments.

/// Class invoked when no configuration overrides it.
pub const DEFAULT_ENTRY_CLASS: &str = "com/guardium/gui/AppMain";

pub const ENTRY_METHOD: &str = "main";
/// `static void main(String[])`
pub const ENTRY_SIGNATURE: &str = "([Ljava/lang/String;)V";

pub const SHUTDOWN_METHOD: &str = "shutdown";
/// `static void shutdown()`
pub const SHUTDOWN_SIGNATURE: &str = "()V";

/// The application class and its static entry method.
///
/// The method name and signature are fixed; only the class varies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointDescriptor {
    class_name: String,
}

impl EntryPointDescriptor {
    /// Accepts dotted or slash-separated names and stores the slash form.
    #[must_use]
    pub fn new(class_name: impl Into<String>) -> Self {
        let class_name: String = class_name.into();
        Self {
            class_name: class_name.trim().replace('.', "/"),
        }
    }

    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    #[must_use]
    pub fn method_name(&self) -> &'static str {
        ENTRY_METHOD
    }

    #[must_use]
    pub fn signature(&self) -> &'static str {
        ENTRY_SIGNATURE
    }
}

impl Default for EntryPointDescriptor {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRY_CLASS)
    }
}

/// Ordered `key=value` parameters passed to the entry method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationArguments(Vec<String>);

impl ApplicationArguments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The parameters the launcher always passes to the application.
    #[must_use]
    pub fn launch_defaults() -> Self {
        Self::new().param("DISCOVERY_SCAN_INTERVAL", "1440")
    }

    #[must_use]
    pub fn param(mut self, key: &str, value: impl std::fmt::Display) -> Self {
        self.0.push(format!("{key}={value}"));
        self
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
