//! Host capabilities the core signals but never performs itself.
//!
//! The host injects implementations backed by its router, its share sheet,
//! or whatever the platform offers. The core only decides *when* and *what*.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Send the user to the sign-in flow.
    SignIn,
    /// Open an external URL, e.g. a maps deep link.
    External(String),
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}

/// Title and body handed to the platform share surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShareError {
    /// The platform has no share surface.
    #[error("sharing is not supported")]
    Unsupported,
    #[error("share failed: {0}")]
    Failed(String),
}

pub trait Sharer: Send + Sync {
    fn share(&self, payload: &SharePayload) -> Result<(), ShareError>;
}

/// Navigator for hosts without routing; every signal is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _target: NavigationTarget) {}
}
