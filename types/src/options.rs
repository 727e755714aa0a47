//! Runtime creation options.

use thiserror::Error;

/// Prefix of the synthesized classpath option.
pub const CLASSPATH_OPTION_PREFIX: &str = "-Djava.class.path=";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("classpath must contain at least one entry")]
pub struct EmptyClasspathError;

/// Ordered option strings handed to runtime creation.
///
/// The classpath option is always first; auxiliary options follow in the
/// order supplied. There is no way to construct a value without a classpath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapOptions(Vec<String>);

impl BootstrapOptions {
    pub fn new<C, A>(classpath: &[C], auxiliary: &[A]) -> Result<Self, EmptyClasspathError>
    where
        C: AsRef<str>,
        A: AsRef<str>,
    {
        let classpath = Self::classpath_option(classpath)?;
        let mut options = Vec::with_capacity(auxiliary.len() + 1);
        options.push(classpath);
        options.extend(auxiliary.iter().map(|opt| opt.as_ref().to_string()));
        Ok(Self(options))
    }

    /// Build `-Djava.class.path=` with every entry followed by `;`.
    ///
    /// Entries are used as given: no existence check, no deduplication.
    pub fn classpath_option<C: AsRef<str>>(entries: &[C]) -> Result<String, EmptyClasspathError> {
        if entries.is_empty() {
            return Err(EmptyClasspathError);
        }
        let mut option = String::from(CLASSPATH_OPTION_PREFIX);
        for entry in entries {
            option.push_str(entry.as_ref());
            option.push(';');
        }
        Ok(option)
    }

    #[must_use]
    pub fn classpath(&self) -> &str {
        &self.0[0]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: construction requires a classpath.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
