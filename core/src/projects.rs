use crate::notify::Notifier;
use crate::storage::{keys, LocalStore};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Append-only thread entry; never mutated or removed individually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// A storefront attached to a project by the research flow. The payload is
/// whatever the analysis produced; the client only carries it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Storefront {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub storefronts: Vec<Storefront>,
    #[serde(default)]
    pub selected_storefront: Option<String>,
    #[serde(default)]
    pub report_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            messages: Vec::new(),
            storefronts: Vec::new(),
            selected_storefront: None,
            report_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Project list with an active selection and a "landing" mode that defers
/// project creation until the first message is typed. Entirely local: every
/// mutation writes the full list back to [`LocalStore`].
#[derive(Clone)]
pub struct ProjectStore {
    inner: Arc<RwLock<ProjectsInner>>,
    storage: LocalStore,
    notifier: Notifier,
}

struct ProjectsInner {
    projects: Vec<Project>,
    active_project: Option<Uuid>,
    landing: bool,
}

impl ProjectStore {
    pub fn new(storage: LocalStore) -> Self {
        let projects = storage.get(keys::PROJECTS).unwrap_or_default();
        Self {
            inner: Arc::new(RwLock::new(ProjectsInner {
                projects,
                active_project: None,
                landing: true,
            })),
            storage,
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<()> {
        self.notifier.subscribe()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.inner.read().projects.clone()
    }

    pub fn project(&self, id: Uuid) -> Option<Project> {
        self.inner.read().projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn active_project(&self) -> Option<Project> {
        let inner = self.inner.read();
        let id = inner.active_project?;
        inner.projects.iter().find(|p| p.id == id).cloned()
    }

    pub fn active_project_id(&self) -> Option<Uuid> {
        self.inner.read().active_project
    }

    /// True when the UI is on the empty landing state with no active project.
    pub fn is_landing(&self) -> bool {
        self.inner.read().landing
    }

    /// Create a project named from the first message (when given), make it
    /// active and leave landing mode.
    pub fn create_project(&self, first_message: Option<&str>) -> Uuid {
        let name = first_message
            .map(derive_project_name)
            .unwrap_or_else(|| "New Project".to_string());
        let project = Project::new(name);
        let id = project.id;
        self.mutate(|inner| {
            inner.projects.insert(0, project);
            inner.active_project = Some(id);
            inner.landing = false;
            Some(())
        });
        id
    }

    /// Clear the active project and show the landing state. Creation of the
    /// next project is deferred until its first message arrives. No-op when
    /// already on the landing state.
    pub fn start_new_project(&self) {
        {
            let inner = self.inner.read();
            if inner.landing && inner.active_project.is_none() {
                return;
            }
        }
        self.mutate(|inner| {
            inner.active_project = None;
            inner.landing = true;
            Some(())
        });
    }

    /// Append a message. The first user-role message also names the project.
    pub fn add_message(
        &self,
        project_id: Uuid,
        role: MessageRole,
        content: impl Into<String>,
    ) -> Option<ChatMessage> {
        let message = ChatMessage::new(role, content);
        self.mutate(|inner| {
            let project = inner.projects.iter_mut().find(|p| p.id == project_id)?;
            if message.role == MessageRole::User
                && !project.messages.iter().any(|m| m.role == MessageRole::User)
            {
                project.name = derive_project_name(&message.content);
            }
            project.messages.push(message.clone());
            project.updated_at = Utc::now();
            Some(message)
        })
    }

    pub fn set_storefronts(&self, project_id: Uuid, storefronts: Vec<Storefront>) {
        self.update_project(project_id, |project| project.storefronts = storefronts);
    }

    pub fn select_storefront(&self, project_id: Uuid, storefront_id: Option<String>) {
        self.update_project(project_id, |project| {
            project.selected_storefront = storefront_id
        });
    }

    pub fn set_report_url(&self, project_id: Uuid, url: impl Into<String>) {
        let url = url.into();
        self.update_project(project_id, |project| project.report_url = Some(url));
    }

    /// Targeted copy-on-write update; touches `updated_at`.
    pub fn update_project(&self, project_id: Uuid, apply: impl FnOnce(&mut Project)) -> bool {
        self.mutate(|inner| {
            let project = inner.projects.iter_mut().find(|p| p.id == project_id)?;
            apply(project);
            project.updated_at = Utc::now();
            Some(())
        })
        .is_some()
    }

    pub fn delete_project(&self, project_id: Uuid) -> bool {
        self.mutate(|inner| {
            let before = inner.projects.len();
            inner.projects.retain(|p| p.id != project_id);
            if before == inner.projects.len() {
                return None;
            }
            if inner.active_project == Some(project_id) {
                inner.active_project = None;
                inner.landing = true;
            }
            Some(())
        })
        .is_some()
    }

    /// Stash an unauthenticated user's draft message across a login redirect.
    pub fn set_pending_message(&self, content: &str) {
        self.storage.set(keys::PENDING_MESSAGE, content);
    }

    pub fn take_pending_message(&self) -> Option<String> {
        let pending = self.storage.get::<String>(keys::PENDING_MESSAGE);
        if pending.is_some() {
            self.storage.remove(keys::PENDING_MESSAGE);
        }
        pending
    }

    /// Run a mutation under the write lock. Closures report `None` when they
    /// changed nothing, in which case neither persistence nor subscribers are
    /// touched.
    fn mutate<R>(&self, apply: impl FnOnce(&mut ProjectsInner) -> Option<R>) -> Option<R> {
        let result = {
            let mut inner = self.inner.write();
            let result = apply(&mut inner);
            if result.is_some() {
                self.storage.set(keys::PROJECTS, &inner.projects);
            }
            result
        };
        if result.is_some() {
            self.notifier.notify();
        }
        result
    }
}

const NAME_LIMIT: usize = 40;

/// Derive a project name from its first message: attachment markers and
/// newlines stripped, whitespace collapsed, truncated at a word boundary
/// within the limit and finished with an ellipsis.
pub fn derive_project_name(raw: &str) -> String {
    let cleaned = strip_attachment_markers(raw).replace(['\r', '\n'], " ");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        return "New Project".to_string();
    }
    if cleaned.chars().count() <= NAME_LIMIT {
        return cleaned;
    }
    let window: String = cleaned.chars().take(NAME_LIMIT).collect();
    let mut name = match window.rfind(' ') {
        Some(cut) => window[..cut].trim_end().to_string(),
        // One long word: hard cut, leaving room for the ellipsis.
        None => window.chars().take(NAME_LIMIT - 1).collect(),
    };
    if name.is_empty() {
        name = window.chars().take(NAME_LIMIT - 1).collect();
    }
    name.push('…');
    name
}

fn strip_attachment_markers(raw: &str) -> String {
    const MARKER: &str = "[Attachment:";
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(start) = rest.find(MARKER) {
        out.push_str(&rest[..start]);
        match rest[start..].find(']') {
            Some(end) => rest = &rest[start + end + 1..],
            // Unterminated marker swallows the tail.
            None => return out,
        }
    }
    out.push_str(rest);
    out
}
