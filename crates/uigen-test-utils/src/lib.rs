//! Testing utilities for UIGen workspace
//!
//! Recording fakes for every reconciler collaborator. All fakes share one
//! [`CallLog`], so tests can assert the exact cross-collaborator call order.

#![allow(missing_docs)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use uigen_session::{
    AnonymousWorkSnapshot, AuthError, AuthGateway, AuthResult, ChatMessage, DirectoryError,
    FileSystemData, Navigator, Project, ProjectCreationSpec, ProjectDirectory, ResolvedRoute,
    SessionReconciler, SessionStatus, StoreError, WorkStore,
};

/// One collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
    StoreGet,
    StoreClear,
    ListProjects,
    CreateProject(ProjectCreationSpec),
    Navigate(String),
}

/// Shared, ordered record of collaborator calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: Call) {
        self.0.lock().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.0.lock().iter().filter(|c| pred(c)).count()
    }

    pub fn created_specs(&self) -> Vec<ProjectCreationSpec> {
        self.0
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::CreateProject(spec) => Some(spec.clone()),
                _ => None,
            })
            .collect()
    }

    /// Names of the calls in order, for compact assertions
    pub fn kinds(&self) -> Vec<&'static str> {
        self.0
            .lock()
            .iter()
            .map(|c| match c {
                Call::SignIn { .. } => "sign_in",
                Call::SignUp { .. } => "sign_up",
                Call::StoreGet => "store_get",
                Call::StoreClear => "store_clear",
                Call::ListProjects => "list_projects",
                Call::CreateProject(_) => "create_project",
                Call::Navigate(_) => "navigate",
            })
            .collect()
    }
}

/// What the fake gateway answers
#[derive(Debug, Clone)]
pub enum AuthScript {
    Accept,
    Reject(String),
    Fault(String),
}

/// Auth gateway answering from a script, optionally held at a gate
#[derive(Debug)]
pub struct FakeAuthGateway {
    log: CallLog,
    script: Mutex<AuthScript>,
    gate: Option<Arc<Notify>>,
}

impl FakeAuthGateway {
    pub fn new(log: CallLog, script: AuthScript) -> Self {
        Self {
            log,
            script: Mutex::new(script),
            gate: None,
        }
    }

    /// Hold every call until the returned gate is opened with `notify_one`
    pub fn gated(log: CallLog, script: AuthScript) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let gateway = Self {
            log,
            script: Mutex::new(script),
            gate: Some(Arc::clone(&gate)),
        };
        (gateway, gate)
    }

    pub fn set_script(&self, script: AuthScript) {
        *self.script.lock() = script;
    }

    async fn answer(&self) -> Result<AuthResult, AuthError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let script = self.script.lock().clone();
        match script {
            AuthScript::Accept => Ok(AuthResult::ok()),
            AuthScript::Reject(reason) => Ok(AuthResult::rejected(reason)),
            AuthScript::Fault(reason) => Err(AuthError::Unavailable(reason)),
        }
    }
}

#[async_trait]
impl AuthGateway for FakeAuthGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        self.log.record(Call::SignIn {
            email: email.to_string(),
            password: password.to_string(),
        });
        self.answer().await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        self.log.record(Call::SignUp {
            email: email.to_string(),
            password: password.to_string(),
        });
        self.answer().await
    }
}

/// Work store holding a scripted snapshot
#[derive(Debug)]
pub struct FakeWorkStore {
    log: CallLog,
    slot: Mutex<Option<AnonymousWorkSnapshot>>,
    fail_get: Option<String>,
    fail_clear: Option<String>,
}

impl FakeWorkStore {
    pub fn new(log: CallLog, snapshot: Option<AnonymousWorkSnapshot>) -> Self {
        Self {
            log,
            slot: Mutex::new(snapshot),
            fail_get: None,
            fail_clear: None,
        }
    }

    pub fn failing_get(mut self, reason: impl Into<String>) -> Self {
        self.fail_get = Some(reason.into());
        self
    }

    pub fn failing_clear(mut self, reason: impl Into<String>) -> Self {
        self.fail_clear = Some(reason.into());
        self
    }

    /// Current contents without recording a call
    pub fn peek(&self) -> Option<AnonymousWorkSnapshot> {
        self.slot.lock().clone()
    }
}

impl WorkStore for FakeWorkStore {
    fn get(&self) -> Result<Option<AnonymousWorkSnapshot>, StoreError> {
        self.log.record(Call::StoreGet);
        if let Some(reason) = &self.fail_get {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        Ok(self.slot.lock().clone())
    }

    fn put(&self, snapshot: AnonymousWorkSnapshot) -> Result<(), StoreError> {
        *self.slot.lock() = Some(snapshot);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.log.record(Call::StoreClear);
        if let Some(reason) = &self.fail_clear {
            return Err(StoreError::Unavailable(reason.clone()));
        }
        self.slot.lock().take();
        Ok(())
    }
}

/// Project directory with scripted listing and sequential ids
#[derive(Debug)]
pub struct FakeDirectory {
    log: CallLog,
    projects: Mutex<Vec<Project>>,
    created: Mutex<usize>,
    next_id: Mutex<Option<String>>,
    fail_list: Option<String>,
    fail_create: Option<String>,
}

impl FakeDirectory {
    pub fn new(log: CallLog, projects: Vec<Project>) -> Self {
        Self {
            log,
            projects: Mutex::new(projects),
            created: Mutex::new(0),
            next_id: Mutex::new(None),
            fail_list: None,
            fail_create: None,
        }
    }

    /// Id the next created project receives
    pub fn returning_id(self, id: impl Into<String>) -> Self {
        *self.next_id.lock() = Some(id.into());
        self
    }

    pub fn failing_list(mut self, reason: impl Into<String>) -> Self {
        self.fail_list = Some(reason.into());
        self
    }

    pub fn failing_create(mut self, reason: impl Into<String>) -> Self {
        self.fail_create = Some(reason.into());
        self
    }
}

#[async_trait]
impl ProjectDirectory for FakeDirectory {
    async fn list_projects(&self) -> Result<Vec<Project>, DirectoryError> {
        self.log.record(Call::ListProjects);
        if let Some(reason) = &self.fail_list {
            return Err(DirectoryError::Unavailable(reason.clone()));
        }
        Ok(self.projects.lock().clone())
    }

    async fn create_project(&self, spec: ProjectCreationSpec) -> Result<Project, DirectoryError> {
        self.log.record(Call::CreateProject(spec.clone()));
        if let Some(reason) = &self.fail_create {
            return Err(DirectoryError::Unavailable(reason.clone()));
        }
        let id = self.next_id.lock().take().unwrap_or_else(|| {
            let mut created = self.created.lock();
            *created += 1;
            format!("created-{created}")
        });
        let project = Project::new(id, spec.name);
        self.projects.lock().insert(0, project.clone());
        Ok(project)
    }
}

/// Navigator recording each redirect and whether loading was still on
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    log: CallLog,
    probe: Option<watch::Receiver<SessionStatus>>,
    loading_at_redirect: Mutex<Vec<bool>>,
}

impl RecordingNavigator {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            probe: None,
            loading_at_redirect: Mutex::new(Vec::new()),
        }
    }

    pub fn with_probe(mut self, probe: watch::Receiver<SessionStatus>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn loading_at_redirect(&self) -> Vec<bool> {
        self.loading_at_redirect.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, route: &ResolvedRoute) {
        self.log.record(Call::Navigate(route.path.clone()));
        if let Some(probe) = &self.probe {
            self.loading_at_redirect.lock().push(probe.borrow().is_loading());
        }
    }
}

/// Reconciler wired to recording fakes
pub struct Harness {
    pub log: CallLog,
    pub store: Arc<FakeWorkStore>,
    pub directory: Arc<FakeDirectory>,
    pub navigator: Arc<RecordingNavigator>,
    pub reconciler: SessionReconciler,
}

impl Harness {
    pub fn new(
        log: CallLog,
        auth: FakeAuthGateway,
        store: FakeWorkStore,
        directory: FakeDirectory,
    ) -> Self {
        let store = Arc::new(store);
        let directory = Arc::new(directory);
        let reconciler = SessionReconciler::new(
            Arc::new(auth),
            Arc::clone(&store) as Arc<dyn WorkStore>,
            Arc::clone(&directory) as Arc<dyn ProjectDirectory>,
        );
        let navigator =
            Arc::new(RecordingNavigator::new(log.clone()).with_probe(reconciler.subscribe()));
        let reconciler = reconciler.with_navigator(Arc::clone(&navigator) as Arc<dyn Navigator>);
        Self {
            log,
            store,
            directory,
            navigator,
            reconciler,
        }
    }

    /// Accepting gateway, given snapshot and project list
    pub fn accepting(snapshot: Option<AnonymousWorkSnapshot>, projects: Vec<Project>) -> Self {
        let log = CallLog::new();
        Self::new(
            log.clone(),
            FakeAuthGateway::new(log.clone(), AuthScript::Accept),
            FakeWorkStore::new(log.clone(), snapshot),
            FakeDirectory::new(log, projects),
        )
    }
}

/// Snapshot with `n` user messages and one generated file
pub fn snapshot_with_messages(n: usize) -> AnonymousWorkSnapshot {
    let messages = (1..=n)
        .map(|i| ChatMessage::user(i.to_string(), format!("message {i}")))
        .collect();
    let mut files = FileSystemData::new();
    files.insert("/App.jsx".to_string(), "export default function App() {}".to_string());
    AnonymousWorkSnapshot::new(messages, files)
}

/// Snapshot with files but no messages
pub fn files_only_snapshot() -> AnonymousWorkSnapshot {
    let mut snapshot = snapshot_with_messages(0);
    snapshot
        .file_system_data
        .insert("test.tsx".to_string(), "test content".to_string());
    snapshot
}

/// `[project-1 (recent), project-2 (older)]`
pub fn two_projects() -> Vec<Project> {
    vec![
        Project::new("project-1", "Recent Project"),
        Project::new("project-2", "Older Project"),
    ]
}

/// Whether `name` is `New Design #` followed by digits only
pub fn is_bootstrap_name(name: &str) -> bool {
    name.strip_prefix("New Design #")
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}
