pub mod auth;
pub mod config;
pub mod folders;
pub mod http;
pub mod library;
pub mod notify;
pub mod projects;
pub mod state;
pub mod storage;
pub mod telemetry;
pub mod toast;

pub use auth::{AuthStore, User};
pub use config::{ConfigError, Settings};
pub use folders::{Folder, FolderChat, FolderChatMessage, FolderFile, FolderStore};
pub use http::{ApiClient, ApiError, ApiTransport, FilePayload, HttpTransport};
pub use library::{LibraryDraft, LibraryItem, LibraryStore};
pub use notify::Notifier;
pub use projects::{ChatMessage, MessageRole, Project, ProjectStore, Storefront};
pub use state::AppState;
pub use storage::LocalStore;
pub use toast::{Toast, ToastConfig, ToastLevel, ToastStore};
