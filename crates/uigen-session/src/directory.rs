//! Project directory
//!
//! `list_projects` returns persisted projects most-recent-first; the
//! reconciler relies on that ordering and takes the first element.
//!
//! [`LocalDirectory`] scopes both operations to the signed-in account once a
//! [`SessionSource`] is attached. Without one it is a single-account store.

use crate::error::DirectoryError;
use crate::gateway::SessionSource;
use crate::persist;
use crate::types::{ChatMessage, FileSystemData, Project, ProjectCreationSpec, ProjectId};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use ulid::Ulid;

/// Persisted projects of the authenticated account
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// All projects, most recently updated first
    async fn list_projects(&self) -> Result<Vec<Project>, DirectoryError>;

    /// Persist a new project
    async fn create_project(&self, spec: ProjectCreationSpec) -> Result<Project, DirectoryError>;
}

/// A project together with its contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredProject {
    /// Project metadata
    #[serde(flatten)]
    pub project: Project,
    /// Account that created the project
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Chat transcript
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Virtual file system
    #[serde(default)]
    pub data: FileSystemData,
}

/// Local project directory, optionally persisted as a JSON file
///
/// Project ids are ULIDs, so creation order is also id order.
#[derive(Debug, Default)]
pub struct LocalDirectory {
    projects: RwLock<Vec<StoredProject>>,
    path: Option<PathBuf>,
    session: Option<Arc<dyn SessionSource>>,
}

impl LocalDirectory {
    /// File name used under a data directory
    pub const FILE_NAME: &'static str = "projects.json";

    /// Create an empty in-memory directory
    #[inline]
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open (or start) the directory at `<dir>/projects.json`
    ///
    /// # Errors
    /// `DirectoryError` if an existing file cannot be read or parsed.
    pub fn open(dir: &Path) -> Result<Self, DirectoryError> {
        let path = dir.join(Self::FILE_NAME);
        let mut projects = persist::read_json::<Vec<StoredProject>, DirectoryError>(&path)?
            .unwrap_or_default();
        sort_most_recent_first(&mut projects);
        Ok(Self {
            projects: RwLock::new(projects),
            path: Some(path),
            session: None,
        })
    }

    /// Scope listing and creation to the account signed in on `session`
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn SessionSource>) -> Self {
        self.session = Some(session);
        self
    }

    /// Projects created by `owner`, most recent first
    #[must_use]
    pub fn owned_by(&self, owner: &str) -> Vec<Project> {
        self.projects
            .read()
            .iter()
            .filter(|p| p.owner.as_deref() == Some(owner))
            .map(|p| p.project.clone())
            .collect()
    }

    /// Full record of a project
    #[must_use]
    pub fn get(&self, id: &ProjectId) -> Option<StoredProject> {
        self.projects
            .read()
            .iter()
            .find(|p| &p.project.id == id)
            .cloned()
    }

    /// Number of projects
    #[must_use]
    pub fn len(&self) -> usize {
        self.projects.read().len()
    }

    /// Whether the directory has no projects
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.projects.read().is_empty()
    }

    /// `Ok(None)` when unscoped, the signed-in account when scoped
    fn scope(&self) -> Result<Option<String>, DirectoryError> {
        match &self.session {
            None => Ok(None),
            Some(session) => session
                .current_user()
                .map(Some)
                .ok_or(DirectoryError::Unauthenticated),
        }
    }

    fn persist(&self, projects: &[StoredProject]) -> Result<(), DirectoryError> {
        match &self.path {
            Some(path) => persist::write_json_atomic::<_, DirectoryError>(path, projects),
            None => Ok(()),
        }
    }
}

fn sort_most_recent_first(projects: &mut [StoredProject]) {
    projects.sort_by(|a, b| {
        b.project
            .updated_at
            .cmp(&a.project.updated_at)
            .then_with(|| b.project.id.cmp(&a.project.id))
    });
}

#[async_trait]
impl ProjectDirectory for LocalDirectory {
    async fn list_projects(&self) -> Result<Vec<Project>, DirectoryError> {
        let Some(owner) = self.scope()? else {
            return Ok(self
                .projects
                .read()
                .iter()
                .map(|p| p.project.clone())
                .collect());
        };
        Ok(self.owned_by(&owner))
    }

    async fn create_project(&self, spec: ProjectCreationSpec) -> Result<Project, DirectoryError> {
        if spec.name.trim().is_empty() {
            return Err(DirectoryError::Rejected("project name is empty".to_string()));
        }
        let owner = self.scope()?;

        let now = Utc::now();
        let project = Project {
            id: ProjectId::new(Ulid::new().to_string()),
            name: spec.name,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let record = StoredProject {
            project: project.clone(),
            owner,
            messages: spec.messages,
            data: spec.data,
        };

        let mut projects = self.projects.write();
        projects.insert(0, record);
        if let Err(e) = self.persist(&projects) {
            projects.remove(0);
            return Err(e);
        }

        tracing::debug!(id = %project.id, name = %project.name, "project created");
        Ok(project)
    }
}
