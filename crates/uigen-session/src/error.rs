//! Error types for the session core
//!
//! Credential rejection is NOT an error: it travels as an unsuccessful
//! [`AuthResult`](crate::types::AuthResult). Everything here is an
//! infrastructure fault that the reconciler propagates without recovery:
//! - Auth gateway transport failures
//! - Work store read/clear failures
//! - Project directory list/create failures
//! - Configuration loading failures

use crate::state::Phase;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Auth gateway infrastructure fault
    #[error("auth gateway error: {0}")]
    Auth(#[from] AuthError),

    /// Ephemeral work store fault
    #[error("work store error: {0}")]
    Store(#[from] StoreError),

    /// Project directory fault
    #[error("project directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Reconciliation attempted an illegal phase transition
    #[error("state error: {0}")]
    State(#[from] StateError),
}

impl SessionError {
    /// Check if the failing collaborator call may succeed when repeated
    ///
    /// The reconciler itself never retries; this is advice for callers.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Auth(e) => e.is_retryable(),
            Self::Directory(e) => e.is_retryable(),
            Self::Store(StoreError::Io(_)) => true,
            Self::Store(_) | Self::State(_) => false,
        }
    }

    /// Which collaborator produced the fault
    #[must_use]
    pub fn source_kind(&self) -> ErrorSource {
        match self {
            Self::Auth(_) => ErrorSource::AuthGateway,
            Self::Store(_) => ErrorSource::WorkStore,
            Self::Directory(_) => ErrorSource::ProjectDirectory,
            Self::State(_) => ErrorSource::Reconciler,
        }
    }
}

/// Collaborator classification for [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorSource {
    /// Auth gateway
    AuthGateway,
    /// Ephemeral work store
    WorkStore,
    /// Project directory
    ProjectDirectory,
    /// The reconciler's own bookkeeping
    Reconciler,
}

/// Auth gateway infrastructure errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Backend unreachable or refused the request
    #[error("auth backend unavailable: {0}")]
    Unavailable(String),

    /// Account book I/O failed
    #[error("account book i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Account book could not be (de)serialized
    #[error("account book is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AuthError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Ephemeral work store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing storage is not reachable
    #[error("work store unavailable: {0}")]
    Unavailable(String),

    /// File backend I/O failed
    #[error("work store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Project directory errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Backend unreachable
    #[error("project directory unavailable: {0}")]
    Unavailable(String),

    /// Backend refused to create the project
    #[error("project creation rejected: {0}")]
    Rejected(String),

    /// Scoped directory used with no signed-in account
    #[error("no signed-in account")]
    Unauthenticated,

    /// Local directory I/O failed
    #[error("project directory i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Local directory file is corrupt
    #[error("project directory is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DirectoryError {
    /// Check if error is retryable
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Reconciliation phase errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Transition not permitted by the phase machine
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition {
        /// Phase the attempt was in
        from: Phase,
        /// Phase it tried to enter
        to: Phase,
    },
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is unusable
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let err = SessionError::from(DirectoryError::Unavailable("offline".to_string()));
        assert!(err.to_string().contains("project directory unavailable"));
        assert!(err.to_string().contains("offline"));
    }

    #[test]
    fn session_error_is_retryable() {
        assert!(SessionError::from(AuthError::Unavailable("x".into())).is_retryable());
        assert!(SessionError::from(DirectoryError::Unavailable("x".into())).is_retryable());
        assert!(!SessionError::from(DirectoryError::Rejected("quota".into())).is_retryable());
        assert!(!SessionError::from(StoreError::Unavailable("x".into())).is_retryable());
    }

    #[test]
    fn session_error_source_kind() {
        let err = SessionError::from(StoreError::Unavailable("locked".into()));
        assert_eq!(err.source_kind(), ErrorSource::WorkStore);

        let err = SessionError::from(StateError::IllegalTransition {
            from: Phase::Done,
            to: Phase::Redirecting,
        });
        assert_eq!(err.source_kind(), ErrorSource::Reconciler);
        assert!(err.to_string().contains("Done"));
    }
}
