use crate::auth::AuthStore;
use crate::http::{ApiClient, ApiError, FilePayload};
use crate::notify::Notifier;
use crate::projects::MessageRole;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

// Server-owned entities, mirrored locally. The wire format is camelCase JSON
// with ISO-8601 dates; serde restores the dates as native values.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub files: Vec<FolderFile>,
    #[serde(default)]
    pub file_count: usize,
    #[serde(default)]
    pub chat_count: usize,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderChatMessage {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FolderChat {
    pub id: String,
    pub folder_id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<FolderChatMessage>,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted by the folder PATCH endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FolderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Remote-backed folder state.
///
/// The server is authoritative: `fetch_folders` replaces the local list
/// wholesale, and every mutation applies the server-confirmed record after
/// the call resolves. The denormalized `file_count`/`chat_count` fields move
/// in lockstep with their lists and clamp at zero.
#[derive(Clone)]
pub struct FolderStore {
    inner: Arc<RwLock<FoldersInner>>,
    api: ApiClient,
    auth: AuthStore,
    notifier: Notifier,
}

#[derive(Default)]
struct FoldersInner {
    folders: Vec<Folder>,
    chats: Vec<FolderChat>,
    active_folder: Option<String>,
    active_chat: Option<String>,
}

impl FolderStore {
    pub fn new(api: ApiClient, auth: AuthStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(FoldersInner::default())),
            api,
            auth,
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<()> {
        self.notifier.subscribe()
    }

    pub fn folders(&self) -> Vec<Folder> {
        self.inner.read().folders.clone()
    }

    pub fn folder(&self, id: &str) -> Option<Folder> {
        self.inner.read().folders.iter().find(|f| f.id == id).cloned()
    }

    pub fn chats(&self) -> Vec<FolderChat> {
        self.inner.read().chats.clone()
    }

    pub fn active_folder_id(&self) -> Option<String> {
        self.inner.read().active_folder.clone()
    }

    pub fn active_chat_id(&self) -> Option<String> {
        self.inner.read().active_chat.clone()
    }

    pub fn active_chat(&self) -> Option<FolderChat> {
        let inner = self.inner.read();
        let id = inner.active_chat.clone()?;
        inner.chats.iter().find(|c| c.id == id).cloned()
    }

    /// Replace the local list with server state. Skipped entirely when not
    /// authenticated: no request is issued and nothing changes.
    pub async fn fetch_folders(&self) -> Result<(), ApiError> {
        let Ok(token) = self.require_token() else {
            return Ok(());
        };
        let folders: Vec<Folder> = self.api.get("/folders", Some(&token)).await?;
        self.inner.write().folders = folders;
        self.notifier.notify();
        Ok(())
    }

    pub async fn create_folder(&self, name: &str, description: &str) -> Result<Folder, ApiError> {
        let token = self.require_token()?;
        let folder: Folder = self
            .api
            .post(
                "/folders",
                Some(&token),
                &json!({ "name": name, "description": description }),
            )
            .await?;
        self.inner.write().folders.insert(0, folder.clone());
        self.notifier.notify();
        Ok(folder)
    }

    pub async fn update_folder(&self, id: &str, patch: FolderPatch) -> Result<Folder, ApiError> {
        let token = self.require_token()?;
        let updated: Folder = self
            .api
            .patch(&format!("/folders/{id}"), Some(&token), &patch)
            .await?;
        {
            let mut inner = self.inner.write();
            if let Some(existing) = inner.folders.iter_mut().find(|f| f.id == id) {
                *existing = updated.clone();
            }
        }
        self.notifier.notify();
        Ok(updated)
    }

    /// Delete a folder; when it was the active one, the active chat and the
    /// cached chat list go with it.
    pub async fn delete_folder(&self, id: &str) -> Result<(), ApiError> {
        let token = self.require_token()?;
        self.api.delete(&format!("/folders/{id}"), Some(&token)).await?;
        {
            let mut inner = self.inner.write();
            inner.folders.retain(|f| f.id != id);
            if inner.active_folder.as_deref() == Some(id) {
                inner.active_folder = None;
                inner.active_chat = None;
                inner.chats.clear();
            }
        }
        self.notifier.notify();
        Ok(())
    }

    /// Multipart upload; the platform supplies the boundary, so no JSON
    /// content type is sent.
    pub async fn upload_file(
        &self,
        folder_id: &str,
        file: FilePayload,
    ) -> Result<FolderFile, ApiError> {
        let token = self.require_token()?;
        let uploaded: FolderFile = self
            .api
            .upload(&format!("/folders/{folder_id}/files"), Some(&token), file)
            .await?;
        {
            let mut inner = self.inner.write();
            if let Some(folder) = inner.folders.iter_mut().find(|f| f.id == folder_id) {
                folder.files.push(uploaded.clone());
                folder.file_count += 1;
                folder.updated_at = Utc::now();
            }
        }
        self.notifier.notify();
        Ok(uploaded)
    }

    pub async fn delete_file(&self, folder_id: &str, file_id: &str) -> Result<(), ApiError> {
        let token = self.require_token()?;
        self.api
            .delete(&format!("/folders/{folder_id}/files/{file_id}"), Some(&token))
            .await?;
        {
            let mut inner = self.inner.write();
            if let Some(folder) = inner.folders.iter_mut().find(|f| f.id == folder_id) {
                let before = folder.files.len();
                folder.files.retain(|f| f.id != file_id);
                if folder.files.len() != before {
                    folder.file_count = folder.file_count.saturating_sub(1);
                    folder.updated_at = Utc::now();
                }
            }
        }
        self.notifier.notify();
        Ok(())
    }

    pub async fn fetch_chats(&self, folder_id: &str) -> Result<(), ApiError> {
        let token = self.require_token()?;
        let chats: Vec<FolderChat> = self
            .api
            .get(&format!("/folders/{folder_id}/chats"), Some(&token))
            .await?;
        self.inner.write().chats = chats;
        self.notifier.notify();
        Ok(())
    }

    pub async fn create_chat(&self, folder_id: &str, title: &str) -> Result<FolderChat, ApiError> {
        let token = self.require_token()?;
        let chat: FolderChat = self
            .api
            .post(
                &format!("/folders/{folder_id}/chats"),
                Some(&token),
                &json!({ "title": title }),
            )
            .await?;
        {
            let mut inner = self.inner.write();
            inner.chats.insert(0, chat.clone());
            inner.active_chat = Some(chat.id.clone());
            if let Some(folder) = inner.folders.iter_mut().find(|f| f.id == folder_id) {
                folder.chat_count += 1;
                folder.updated_at = Utc::now();
            }
        }
        self.notifier.notify();
        Ok(chat)
    }

    pub async fn delete_chat(&self, folder_id: &str, chat_id: &str) -> Result<(), ApiError> {
        let token = self.require_token()?;
        self.api
            .delete(&format!("/folders/{folder_id}/chats/{chat_id}"), Some(&token))
            .await?;
        {
            let mut inner = self.inner.write();
            inner.chats.retain(|c| c.id != chat_id);
            if inner.active_chat.as_deref() == Some(chat_id) {
                inner.active_chat = None;
            }
            if let Some(folder) = inner.folders.iter_mut().find(|f| f.id == folder_id) {
                folder.chat_count = folder.chat_count.saturating_sub(1);
                folder.updated_at = Utc::now();
            }
        }
        self.notifier.notify();
        Ok(())
    }

    /// Persist a chat message and append the server-confirmed record.
    pub async fn add_message(
        &self,
        chat_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<FolderChatMessage, ApiError> {
        let token = self.require_token()?;
        let message: FolderChatMessage = self
            .api
            .post(
                &format!("/chats/{chat_id}/messages"),
                Some(&token),
                &json!({ "role": role, "content": content }),
            )
            .await?;
        {
            let mut inner = self.inner.write();
            if let Some(chat) = inner.chats.iter_mut().find(|c| c.id == chat_id) {
                chat.messages.push(message.clone());
            }
        }
        self.notifier.notify();
        Ok(message)
    }

    pub fn set_active_folder(&self, folder_id: Option<String>) {
        {
            let mut inner = self.inner.write();
            if inner.active_folder != folder_id {
                inner.active_chat = None;
                inner.chats.clear();
            }
            inner.active_folder = folder_id;
        }
        self.notifier.notify();
    }

    pub fn set_active_chat(&self, chat_id: Option<String>) {
        self.inner.write().active_chat = chat_id;
        self.notifier.notify();
    }

    /// Invoked on the auth transition to logged-out; wipes all folder and
    /// chat state.
    pub fn clear(&self) {
        *self.inner.write() = FoldersInner::default();
        self.notifier.notify();
    }

    fn require_token(&self) -> Result<String, ApiError> {
        if !self.auth.is_authenticated() {
            return Err(ApiError::Unauthenticated);
        }
        self.auth.access_token().ok_or(ApiError::Unauthenticated)
    }
}
