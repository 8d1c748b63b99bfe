//! Navigation side effect
//!
//! The reconciler returns the [`ResolvedRoute`] to its caller either way; a
//! navigator is only needed when the redirect must be issued before the
//! loading flag drops.

use crate::types::ResolvedRoute;

/// Performs a client-side redirect
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    /// Go to `route`. Fire-and-forget.
    fn go_to(&self, route: &ResolvedRoute);
}

/// Navigator that only logs the redirect
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn go_to(&self, route: &ResolvedRoute) {
        tracing::info!(path = %route.path, "redirect");
    }
}
