//! Session Reconciler
//!
//! Runs one sign-in or sign-up and decides where the session lands:
//! 1. Authenticate through the gateway (rejection is returned as-is)
//! 2. Read the work store once
//! 3. Adopt a snapshot with messages into a new project, then clear the store
//! 4. Otherwise land on the most recent project
//! 5. Otherwise create a fresh project and land on it
//!
//! Collaborator calls within an attempt are strictly sequential. Faults are
//! propagated after the loading state is reset; nothing is retried.
//!
//! # Concurrency
//!
//! [`is_loading`](SessionReconciler::is_loading) is the caller's single-flight
//! hint: disable the sign-in control while it is true. Overlapping calls are
//! NOT rejected; each runs its own attempt and the status channel reports
//! whichever advanced last.

use crate::config::SessionConfig;
use crate::directory::ProjectDirectory;
use crate::error::{SessionError, StateError};
use crate::gateway::{self, AuthGateway};
use crate::naming::{Clock, ProjectNamer};
use crate::navigator::Navigator;
use crate::state::{validate_transition, Phase, SessionStatus};
use crate::store::WorkStore;
use crate::types::{
    AnonymousWorkSnapshot, AuthMethod, Landing, LandingKind, ProjectCreationSpec, Reconciliation,
    ResolvedRoute,
};
use std::sync::Arc;
use tokio::sync::watch;

/// Orchestrates authentication and landing-project resolution
pub struct SessionReconciler {
    auth: Arc<dyn AuthGateway>,
    store: Arc<dyn WorkStore>,
    directory: Arc<dyn ProjectDirectory>,
    navigator: Option<Arc<dyn Navigator>>,
    config: SessionConfig,
    namer: ProjectNamer,
    status: watch::Sender<SessionStatus>,
}

impl std::fmt::Debug for SessionReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionReconciler")
            .field("config", &self.config)
            .field("status", &*self.status.borrow())
            .field("has_navigator", &self.navigator.is_some())
            .finish_non_exhaustive()
    }
}

impl SessionReconciler {
    /// Create reconciler over its collaborators with default config
    #[must_use]
    pub fn new(
        auth: Arc<dyn AuthGateway>,
        store: Arc<dyn WorkStore>,
        directory: Arc<dyn ProjectDirectory>,
    ) -> Self {
        let config = SessionConfig::default();
        let (status, _) = watch::channel(SessionStatus::default());
        Self {
            auth,
            store,
            directory,
            navigator: None,
            namer: ProjectNamer::new(&config),
            config,
            status,
        }
    }

    /// With configuration
    #[must_use]
    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.namer = ProjectNamer::with_clock(&config, self.namer.clock());
        self.config = config;
        self
    }

    /// With clock used for generated project names
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.namer = ProjectNamer::with_clock(&self.config, clock);
        self
    }

    /// With navigator that receives the redirect before loading ends
    #[must_use]
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Get configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether an attempt is in progress
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.borrow().is_loading()
    }

    /// Current status snapshot
    #[inline]
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status.borrow().clone()
    }

    /// Receive every status change
    #[inline]
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status.subscribe()
    }

    /// Sign in an existing account and resolve the landing project
    ///
    /// # Errors
    /// `SessionError` for any infrastructure fault. Rejected credentials are
    /// `Ok` with an unsuccessful [`AuthResult`](crate::types::AuthResult).
    #[tracing::instrument(name = "sign_in", skip_all)]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Reconciliation, SessionError> {
        self.run(AuthMethod::SignIn, email, password).await
    }

    /// Register a new account and resolve the landing project
    ///
    /// # Errors
    /// As [`sign_in`](Self::sign_in).
    #[tracing::instrument(name = "sign_up", skip_all)]
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Reconciliation, SessionError> {
        self.run(AuthMethod::SignUp, email, password).await
    }

    async fn run(
        &self,
        method: AuthMethod,
        email: &str,
        password: &str,
    ) -> Result<Reconciliation, SessionError> {
        let mut attempt = Attempt::begin(&self.status, method);

        let auth = match gateway::authenticate(self.auth.as_ref(), method, email, password).await {
            Ok(auth) => auth,
            Err(e) => {
                tracing::warn!(%method, error = %e, "auth gateway failed");
                attempt.settle(Phase::Failed, Some(e.to_string()));
                return Err(e.into());
            }
        };

        if !auth.success {
            tracing::info!(%method, reason = ?auth.error, "credentials rejected");
            let reason = auth.error.clone().unwrap_or_else(|| "authentication rejected".to_string());
            attempt.settle(Phase::Failed, Some(reason));
            return Ok(Reconciliation::rejected(auth));
        }

        match self.resolve(&mut attempt).await {
            Ok(landing) => {
                tracing::info!(%method, route = %landing.route, "session reconciled");
                attempt.settle(Phase::Done, None);
                Ok(Reconciliation {
                    auth,
                    landing: Some(landing),
                })
            }
            Err(e) => {
                tracing::warn!(%method, error = %e, "reconciliation failed");
                attempt.settle(Phase::Failed, Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Post-authentication landing policy
    async fn resolve(&self, attempt: &mut Attempt<'_>) -> Result<Landing, SessionError> {
        attempt.advance(Phase::Reconciling)?;

        match self.store.get()? {
            Some(snapshot) if snapshot.has_work() => return self.adopt(attempt, snapshot).await,
            Some(snapshot) => {
                tracing::debug!(
                    files = snapshot.file_system_data.len(),
                    "anonymous snapshot has no messages, not adopting"
                );
            }
            None => {}
        }

        let projects = self.directory.list_projects().await?;
        if let Some(latest) = projects.into_iter().next() {
            return self.redirect(attempt, LandingKind::MostRecent { project: latest });
        }

        attempt.advance(Phase::CreatingProject)?;
        let spec = ProjectCreationSpec::empty(self.namer.bootstrap_name());
        let project = self.directory.create_project(spec).await?;
        self.redirect(attempt, LandingKind::Bootstrapped { project })
    }

    async fn adopt(
        &self,
        attempt: &mut Attempt<'_>,
        snapshot: AnonymousWorkSnapshot,
    ) -> Result<Landing, SessionError> {
        attempt.advance(Phase::CreatingProject)?;

        let spec = ProjectCreationSpec::adopting(self.namer.adopted_name(), snapshot);
        let (messages, files) = (spec.messages.len(), spec.data.len());
        let project = self.directory.create_project(spec).await?;

        // The project exists now; a failed clear must not strand the user.
        let store_cleared = match self.store.clear() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(project = %project.id, error = %e, "adopted work left in store");
                false
            }
        };
        tracing::info!(project = %project.id, messages, files, "anonymous work adopted");

        self.redirect(
            attempt,
            LandingKind::Adopted {
                project,
                store_cleared,
            },
        )
    }

    fn redirect(&self, attempt: &mut Attempt<'_>, kind: LandingKind) -> Result<Landing, SessionError> {
        attempt.advance(Phase::Redirecting)?;
        let route = ResolvedRoute::to_project(&self.config.route_prefix, &kind.project().id);
        if let Some(navigator) = &self.navigator {
            navigator.go_to(&route);
        }
        Ok(Landing { route, kind })
    }
}

/// One attempt's phase bookkeeping
///
/// Dropping an unsettled attempt marks it failed, so the in-flight count
/// drops on every exit path.
struct Attempt<'a> {
    status: &'a watch::Sender<SessionStatus>,
    method: AuthMethod,
    phase: Phase,
    settled: bool,
}

impl<'a> Attempt<'a> {
    fn begin(status: &'a watch::Sender<SessionStatus>, method: AuthMethod) -> Self {
        status.send_modify(|s| {
            s.phase = Phase::Authenticating;
            s.method = Some(method);
            s.in_flight += 1;
            s.last_error = None;
        });
        Self {
            status,
            method,
            phase: Phase::Authenticating,
            settled: false,
        }
    }

    fn advance(&mut self, to: Phase) -> Result<(), StateError> {
        validate_transition(self.phase, to)?;
        self.phase = to;
        let method = self.method;
        self.status.send_modify(|s| {
            s.phase = to;
            s.method = Some(method);
        });
        Ok(())
    }

    fn settle(&mut self, to: Phase, error: Option<String>) {
        if self.settled {
            return;
        }
        if let Err(e) = validate_transition(self.phase, to) {
            tracing::error!(error = %e, "settling attempt out of order");
        }
        self.settled = true;
        self.phase = to;
        let method = self.method;
        self.status.send_modify(|s| {
            s.phase = to;
            s.method = Some(method);
            s.in_flight = s.in_flight.saturating_sub(1);
            if error.is_some() {
                s.last_error = error;
            }
        });
    }
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.settle(Phase::Failed, Some("reconciliation abandoned".to_string()));
        }
    }
}
