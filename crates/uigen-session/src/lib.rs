//! UIGen Session - anonymous work handoff
//!
//! Decides where a session lands after sign-in or sign-up:
//! - Adopts pre-authentication chat + files into a new project exactly once
//! - Otherwise opens the most recent project
//! - Otherwise bootstraps a fresh project
//! - Clears the ephemeral cache only after a successful adoption
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use uigen_session::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let reconciler = SessionReconciler::new(
//!     Arc::new(LocalAuthGateway::in_memory()),
//!     Arc::new(MemoryWorkStore::new()),
//!     Arc::new(LocalDirectory::in_memory()),
//! );
//!
//! let outcome = reconciler.sign_up("ada@example.com", "correct horse").await?;
//! if let Some(route) = outcome.route() {
//!     println!("redirect to {route}");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod directory;
pub mod error;
pub mod gateway;
pub mod naming;
pub mod navigator;
mod persist;
pub mod reconciler;
pub mod state;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use config::SessionConfig;
pub use directory::{LocalDirectory, ProjectDirectory, StoredProject};
pub use error::{
    AuthError, ConfigError, DirectoryError, ErrorSource, SessionError, StateError, StoreError,
};
pub use gateway::{AuthGateway, LocalAuthGateway, SessionSource};
pub use naming::{Clock, ProjectNamer, SystemClock};
pub use navigator::{LogNavigator, Navigator};
pub use reconciler::SessionReconciler;
pub use state::{Phase, SessionStatus};
pub use store::{FileWorkStore, MemoryWorkStore, WorkStore};
pub use types::{
    AnonymousWorkSnapshot, AuthMethod, AuthResult, ChatMessage, FileSystemData, Landing,
    LandingKind, MessageRole, Project, ProjectCreationSpec, ProjectId, Reconciliation,
    ResolvedRoute,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring a reconciler
    pub use crate::{
        AnonymousWorkSnapshot, AuthGateway, AuthResult, ChatMessage, FileWorkStore,
        LocalAuthGateway, LocalDirectory, MemoryWorkStore, ProjectDirectory, Reconciliation,
        SessionConfig, SessionError, SessionReconciler, SessionSource, WorkStore,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
