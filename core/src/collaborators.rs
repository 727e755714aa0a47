//! Boundaries to the user-facing pieces of the launch: the splash window.

/// A splash shown while the runtime comes up.
///
/// `close` may be called more than once and must be harmless after the first.
pub trait Splash: Send + Sync {
    fn show(&self);
    fn close(&self);
}

/// No splash at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSplash;

impl Splash for NoSplash {
    fn show(&self) {}

    fn close(&self) {}
}

impl<T: Splash + ?Sized> Splash for &T {
    fn show(&self) {
        (**self).show();
    }

    fn close(&self) {
        (**self).close();
    }
}
