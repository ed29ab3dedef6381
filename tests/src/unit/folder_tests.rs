use super::{chat_json, fixture, folder_json, sign_in};
use mica_core::http::{ApiError, FilePayload, Method, RequestBody};
use mica_core::projects::MessageRole;
use serde_json::json;

fn csv_payload(name: &str) -> FilePayload {
    FilePayload {
        field: "file".into(),
        file_name: name.into(),
        content_type: "text/csv".into(),
        bytes: b"a,b\n1,2\n".to_vec(),
    }
}

#[tokio::test]
async fn unauthenticated_fetch_is_a_noop() {
    let (state, transport) = fixture();
    state.folders.fetch_folders().await.expect("no-op");
    assert_eq!(transport.request_count(), 0);
    assert!(state.folders.folders().is_empty());
}

#[tokio::test]
async fn unauthenticated_mutations_are_rejected() {
    let (state, transport) = fixture();
    let err = state.folders.create_folder("Research", "").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthenticated));
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn fetch_replaces_local_state_with_server_state() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha"), folder_json("f2", "Beta")]));
    state.folders.fetch_folders().await.expect("fetch");
    assert_eq!(state.folders.folders().len(), 2);

    // The next fetch is authoritative even when the server dropped one.
    transport.enqueue_json(json!([folder_json("f2", "Beta")]));
    state.folders.fetch_folders().await.expect("fetch");
    let folders = state.folders.folders();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id, "f2");
}

#[tokio::test]
async fn counts_track_lists_through_a_mutation_sequence() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(folder_json("f1", "Alpha"));
    state.folders.create_folder("Alpha", "").await.expect("create");

    transport.enqueue_json(json!({
        "id": "file-1",
        "name": "data.csv",
        "size": 8,
        "contentType": "text/csv",
        "uploadedAt": "2026-08-30T12:01:00Z"
    }));
    state.folders.upload_file("f1", csv_payload("data.csv")).await.expect("upload");

    transport.enqueue_json(chat_json("c1", "f1", "First pass"));
    state.folders.create_chat("f1", "First pass").await.expect("chat");

    let folder = state.folders.folder("f1").expect("folder");
    assert_eq!(folder.file_count, folder.files.len());
    assert_eq!(folder.file_count, 1);
    assert_eq!(folder.chat_count, 1);

    transport.enqueue_empty();
    state.folders.delete_file("f1", "file-1").await.expect("delete file");
    transport.enqueue_empty();
    state.folders.delete_chat("f1", "c1").await.expect("delete chat");

    let folder = state.folders.folder("f1").expect("folder");
    assert_eq!(folder.file_count, folder.files.len());
    assert_eq!(folder.file_count, 0);
    assert_eq!(folder.chat_count, 0);

    // Deleting something the server already dropped clamps at zero.
    transport.enqueue_empty();
    state.folders.delete_file("f1", "file-1").await.expect("delete file");
    assert_eq!(state.folders.folder("f1").expect("folder").file_count, 0);
}

#[tokio::test]
async fn upload_uses_multipart_without_a_json_content_type() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(folder_json("f1", "Alpha"));
    state.folders.create_folder("Alpha", "").await.expect("create");
    transport.enqueue_json(json!({
        "id": "file-1",
        "name": "data.csv",
        "uploadedAt": "2026-08-30T12:01:00Z"
    }));
    state.folders.upload_file("f1", csv_payload("data.csv")).await.expect("upload");

    let request = transport.requests().pop().expect("request");
    assert_eq!(request.method, Method::Post);
    assert_eq!(request.path, "/folders/f1/files");
    assert!(request.bearer.is_some());
    assert!(matches!(request.body, RequestBody::Multipart(_)));
}

#[tokio::test]
async fn deleting_the_active_folder_clears_the_selection() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha")]));
    state.folders.fetch_folders().await.expect("fetch");
    state.folders.set_active_folder(Some("f1".into()));

    transport.enqueue_json(chat_json("c1", "f1", "Notes"));
    state.folders.create_chat("f1", "Notes").await.expect("chat");
    assert_eq!(state.folders.active_chat_id().as_deref(), Some("c1"));
    assert!(state.folders.active_chat().is_some());

    transport.enqueue_empty();
    state.folders.delete_folder("f1").await.expect("delete");

    assert_eq!(state.folders.active_folder_id(), None);
    assert_eq!(state.folders.active_chat_id(), None);
    assert!(state.folders.active_chat().is_none());
    assert!(state.folders.chats().is_empty());
}

#[tokio::test]
async fn deleting_an_inactive_folder_keeps_the_selection() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha"), folder_json("f2", "Beta")]));
    state.folders.fetch_folders().await.expect("fetch");
    state.folders.set_active_folder(Some("f1".into()));

    transport.enqueue_empty();
    state.folders.delete_folder("f2").await.expect("delete");
    assert_eq!(state.folders.active_folder_id().as_deref(), Some("f1"));
}

#[tokio::test]
async fn add_message_persists_before_appending() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha")]));
    state.folders.fetch_folders().await.expect("fetch");
    transport.enqueue_json(chat_json("c1", "f1", "Notes"));
    state.folders.create_chat("f1", "Notes").await.expect("chat");

    transport.enqueue_json(json!({
        "id": "m1",
        "role": "user",
        "content": "compare these two",
        "createdAt": "2026-08-30T12:02:00Z"
    }));
    let message = state
        .folders
        .add_message("c1", MessageRole::User, "compare these two")
        .await
        .expect("message");
    assert_eq!(message.id, "m1");

    let request = transport.requests().pop().expect("request");
    assert_eq!(request.path, "/chats/c1/messages");
    let chat = state.folders.active_chat().expect("chat");
    assert_eq!(chat.messages.len(), 1);
    assert_eq!(chat.messages[0].content, "compare these two");
}

#[tokio::test]
async fn fetch_chats_replaces_the_cached_list() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha")]));
    state.folders.fetch_folders().await.expect("fetch");
    state.folders.set_active_folder(Some("f1".into()));

    transport.enqueue_json(json!([
        chat_json("c1", "f1", "First pass"),
        chat_json("c2", "f1", "Follow-up")
    ]));
    state.folders.fetch_chats("f1").await.expect("chats");
    assert_eq!(state.folders.chats().len(), 2);

    let request = transport.requests().pop().expect("request");
    assert_eq!(request.path, "/folders/f1/chats");
}

#[tokio::test]
async fn update_folder_applies_the_server_record() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha")]));
    state.folders.fetch_folders().await.expect("fetch");

    let mut renamed = folder_json("f1", "Alpha (archived)");
    renamed["description"] = json!("old research");
    transport.enqueue_json(renamed);
    state
        .folders
        .update_folder(
            "f1",
            mica_core::folders::FolderPatch {
                name: Some("Alpha (archived)".into()),
                description: Some("old research".into()),
            },
        )
        .await
        .expect("update");

    let folder = state.folders.folder("f1").expect("folder");
    assert_eq!(folder.name, "Alpha (archived)");
    assert_eq!(folder.description, "old research");
}

#[tokio::test]
async fn logout_clears_folder_state() {
    let (state, transport) = fixture();
    sign_in(&state, &transport).await;

    transport.enqueue_json(json!([folder_json("f1", "Alpha")]));
    state.folders.fetch_folders().await.expect("fetch");
    state.folders.set_active_folder(Some("f1".into()));

    state.logout();
    assert!(state.folders.folders().is_empty());
    assert_eq!(state.folders.active_folder_id(), None);

    // And the next fetch is a no-op again.
    let before = transport.request_count();
    state.folders.fetch_folders().await.expect("no-op");
    assert_eq!(transport.request_count(), before);
}
