mod auth_tests;
mod folder_tests;
mod toast_tests;

use mica_core::http::mock::MockTransport;
use mica_core::http::ApiTransport;
use mica_core::storage::LocalStore;
use mica_core::toast::ToastConfig;
use mica_core::{ApiClient, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// An [`AppState`] over a temp-dir store and a scripted transport.
pub fn fixture() -> (AppState, Arc<MockTransport>) {
    let storage = LocalStore::in_memory();
    fixture_with_storage(storage)
}

pub fn fixture_with_storage(storage: LocalStore) -> (AppState, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let state = AppState::with_parts(
        storage,
        ApiClient::new(transport.clone() as Arc<dyn ApiTransport>),
        ToastConfig {
            max_visible: 3,
            default_duration: Duration::from_millis(30),
            error_duration: Duration::from_millis(120),
        },
    );
    (state, transport)
}

pub fn user_json(email: &str) -> Value {
    json!({
        "id": "u-1",
        "email": email,
        "name": "Test User",
        "created_at": "2026-08-30T12:00:00Z"
    })
}

pub fn session_json(email: &str) -> Value {
    json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "user": user_json(email)
    })
}

/// Log in through the mock transport so folder calls have a session.
pub async fn sign_in(state: &AppState, transport: &MockTransport) {
    transport.enqueue_json(session_json("tester@example.com"));
    state
        .auth
        .login("tester@example.com", "hunter2")
        .await
        .expect("login");
}

pub fn folder_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "files": [],
        "fileCount": 0,
        "chatCount": 0,
        "updatedAt": "2026-08-30T12:00:00Z"
    })
}

pub fn chat_json(id: &str, folder_id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "folderId": folder_id,
        "title": title,
        "messages": [],
        "createdAt": "2026-08-30T12:00:00Z"
    })
}
