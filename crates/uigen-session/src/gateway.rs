//! Auth gateway
//!
//! The reconciler forwards email and password verbatim; all credential
//! validation lives behind this trait. Rejection is reported as
//! `Ok(AuthResult { success: false, .. })`. `Err` is reserved for
//! infrastructure faults.

use crate::error::AuthError;
use crate::persist;
use crate::types::{AuthMethod, AuthResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Minimum password length accepted by [`LocalAuthGateway`]
pub const MIN_PASSWORD_LEN: usize = 8;

/// Establishes a server-side session
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Authenticate an existing account
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult, AuthError>;

    /// Register a new account and authenticate it
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResult, AuthError>;
}

/// Dispatch on [`AuthMethod`]
pub async fn authenticate(
    gateway: &dyn AuthGateway,
    method: AuthMethod,
    email: &str,
    password: &str,
) -> Result<AuthResult, AuthError> {
    match method {
        AuthMethod::SignIn => gateway.sign_in(email, password).await,
        AuthMethod::SignUp => gateway.sign_up(email, password).await,
    }
}

/// Account holding the current session
///
/// Lets a backend scope its data to whoever the gateway signed in.
pub trait SessionSource: Send + Sync + std::fmt::Debug {
    /// Email of the signed-in account, if any
    fn current_user(&self) -> Option<String>;
}

/// Account book of email -> password digest, optionally persisted as JSON
///
/// Local development and demo backend only. Digests are a single unsalted
/// SHA-256 over email and password, which is not a password hash; put a real
/// auth service behind [`AuthGateway`] for anything user-facing.
#[derive(Debug, Default)]
pub struct LocalAuthGateway {
    accounts: RwLock<BTreeMap<String, String>>,
    current: RwLock<Option<String>>,
    path: Option<PathBuf>,
}

impl LocalAuthGateway {
    /// File name used under a data directory
    pub const FILE_NAME: &'static str = "accounts.json";

    /// Create an in-memory account book
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or start) the account book at `<dir>/accounts.json`
    ///
    /// # Errors
    /// `AuthError` if an existing file cannot be read or parsed.
    pub fn open(dir: &Path) -> Result<Self, AuthError> {
        let path = dir.join(Self::FILE_NAME);
        let accounts = persist::read_json::<BTreeMap<String, String>, AuthError>(&path)?
            .unwrap_or_default();
        Ok(Self {
            accounts: RwLock::new(accounts),
            current: RwLock::new(None),
            path: Some(path),
        })
    }

    /// Email of the account holding the session, if any
    #[must_use]
    pub fn current_user(&self) -> Option<String> {
        self.current.read().clone()
    }

    /// Number of registered accounts
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.read().len()
    }

    fn normalize(email: &str) -> String {
        email.trim().to_lowercase()
    }

    fn digest(email: &str, password: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(email.as_bytes());
        hasher.update([0]);
        hasher.update(password.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn check_shape(email: &str, password: &str) -> Option<AuthResult> {
        if email.is_empty() || password.is_empty() {
            return Some(AuthResult::rejected("Email and password are required"));
        }
        None
    }

    fn persist(&self, accounts: &BTreeMap<String, String>) -> Result<(), AuthError> {
        match &self.path {
            Some(path) => persist::write_json_atomic::<_, AuthError>(path, accounts),
            None => Ok(()),
        }
    }
}

impl SessionSource for LocalAuthGateway {
    fn current_user(&self) -> Option<String> {
        self.current.read().clone()
    }
}

#[async_trait]
impl AuthGateway for LocalAuthGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let email = Self::normalize(email);
        if let Some(rejected) = Self::check_shape(&email, password) {
            return Ok(rejected);
        }

        let expected = self.accounts.read().get(&email).cloned();
        if expected.as_deref() != Some(Self::digest(&email, password).as_str()) {
            tracing::debug!(%email, "sign-in rejected");
            return Ok(AuthResult::rejected("Invalid credentials"));
        }

        *self.current.write() = Some(email);
        Ok(AuthResult::ok())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let email = Self::normalize(email);
        if let Some(rejected) = Self::check_shape(&email, password) {
            return Ok(rejected);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Ok(AuthResult::rejected(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        {
            // Held through the write so the file never lags the map.
            let mut accounts = self.accounts.write();
            if accounts.contains_key(&email) {
                return Ok(AuthResult::rejected("Email already registered"));
            }
            let digest = Self::digest(&email, password);
            accounts.insert(email.clone(), digest);
            if let Err(e) = self.persist(&accounts) {
                accounts.remove(&email);
                tracing::warn!(%email, error = %e, "account not registered");
                return Err(e);
            }
        }

        tracing::info!(%email, "account registered");
        *self.current.write() = Some(email);
        Ok(AuthResult::ok())
    }
}
