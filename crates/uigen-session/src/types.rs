//! Core types for the session handoff
//!
//! Defines the data that flows between the reconciler and its collaborators:
//! - Anonymous work snapshots (chat transcript + virtual file system)
//! - Auth results
//! - Projects and project creation requests
//! - The resolved landing route

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Virtual file system contents: path -> file content
pub type FileSystemData = BTreeMap<String, String>;

/// Author of a chat message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Person typing into the chat
    #[default]
    User,
    /// Generation model
    Assistant,
    /// System instructions
    System,
    /// Tool call output
    Tool,
}

/// A single chat message
///
/// The reconciler never looks inside messages; unknown fields are carried
/// through verbatim so adoption is lossless.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message identifier
    pub id: String,
    /// Author role
    #[serde(default)]
    pub role: MessageRole,
    /// Text content
    #[serde(default)]
    pub content: String,
    /// Fields this crate does not model (tool invocations, attachments, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatMessage {
    /// Create a user message
    #[must_use]
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_role(id, MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_role(id, MessageRole::Assistant, content)
    }

    /// Create a message with an explicit role
    #[must_use]
    pub fn with_role(id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Work performed before authentication
///
/// Serialized in the same camelCase shape the browser cache uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousWorkSnapshot {
    /// Chat transcript, oldest first
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Generated files
    #[serde(default)]
    pub file_system_data: FileSystemData,
}

impl AnonymousWorkSnapshot {
    /// Create snapshot from transcript and files
    #[inline]
    #[must_use]
    pub fn new(messages: Vec<ChatMessage>, file_system_data: FileSystemData) -> Self {
        Self {
            messages,
            file_system_data,
        }
    }

    /// A snapshot only counts as work worth adopting if it has messages.
    #[inline]
    #[must_use]
    pub fn has_work(&self) -> bool {
        !self.messages.is_empty()
    }
}

/// Outcome of a sign-in or sign-up call
///
/// A rejected credential is an ordinary value, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    /// Whether a session was established
    pub success: bool,
    /// Human-readable reason when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResult {
    /// Successful authentication
    #[inline]
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// Rejected authentication with a reason
    #[inline]
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(reason.into()),
        }
    }
}

/// Which auth gateway call started the attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthMethod {
    /// Existing account
    SignIn,
    /// New account
    SignUp,
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SignIn => f.write_str("sign-in"),
            Self::SignUp => f.write_str("sign-up"),
        }
    }
}

/// Persisted project identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Wrap an identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A persisted project as seen by the reconciler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Identifier, also the route segment
    pub id: ProjectId,
    /// Display name
    pub name: String,
    /// Creation time, if the directory reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last modification time, if the directory reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create project reference without timestamps
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ProjectId::new(id),
            name: name.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Input to [`ProjectDirectory::create_project`](crate::directory::ProjectDirectory::create_project)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectCreationSpec {
    /// Project name
    pub name: String,
    /// Adopted transcript (empty for fresh projects)
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Adopted files (empty for fresh projects)
    #[serde(default)]
    pub data: FileSystemData,
}

impl ProjectCreationSpec {
    /// Spec for a fresh, empty project
    #[inline]
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Spec adopting an anonymous snapshot
    #[must_use]
    pub fn adopting(name: impl Into<String>, snapshot: AnonymousWorkSnapshot) -> Self {
        Self {
            name: name.into(),
            messages: snapshot.messages,
            data: snapshot.file_system_data,
        }
    }
}

/// Where the session should land
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRoute {
    /// Target project
    pub project_id: ProjectId,
    /// Client-side path, e.g. `/01J...`
    pub path: String,
}

impl ResolvedRoute {
    /// Build route to a project under `prefix`
    #[must_use]
    pub fn to_project(prefix: &str, project_id: &ProjectId) -> Self {
        let path = if prefix.ends_with('/') {
            format!("{prefix}{project_id}")
        } else {
            format!("{prefix}/{project_id}")
        };
        Self {
            project_id: project_id.clone(),
            path,
        }
    }
}

impl std::fmt::Display for ResolvedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// How the landing project was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LandingKind {
    /// Anonymous work was turned into this new project
    Adopted {
        /// The created project
        project: Project,
        /// Whether the work store was cleared afterwards
        store_cleared: bool,
    },
    /// No anonymous work; the most recent existing project was chosen
    MostRecent {
        /// The chosen project
        project: Project,
    },
    /// No anonymous work and no projects; a fresh project was created
    Bootstrapped {
        /// The created project
        project: Project,
    },
}

impl LandingKind {
    /// Project the session lands on
    #[inline]
    #[must_use]
    pub fn project(&self) -> &Project {
        match self {
            Self::Adopted { project, .. }
            | Self::MostRecent { project }
            | Self::Bootstrapped { project } => project,
        }
    }

    /// Whether a project was created
    #[inline]
    #[must_use]
    pub fn created_project(&self) -> bool {
        !matches!(self, Self::MostRecent { .. })
    }
}

/// Resolved landing: route plus how it was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Landing {
    /// Navigation target
    pub route: ResolvedRoute,
    /// Resolution path taken
    pub kind: LandingKind,
}

/// Result of a reconciliation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The auth gateway's answer, returned as-is
    pub auth: AuthResult,
    /// Present iff authentication succeeded
    pub landing: Option<Landing>,
}

impl Reconciliation {
    /// Attempt rejected by the auth gateway
    #[inline]
    #[must_use]
    pub fn rejected(auth: AuthResult) -> Self {
        Self {
            auth,
            landing: None,
        }
    }

    /// Whether authentication succeeded
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.auth.success
    }

    /// Navigation target, if any
    #[inline]
    #[must_use]
    pub fn route(&self) -> Option<&ResolvedRoute> {
        self.landing.as_ref().map(|l| &l.route)
    }
}
