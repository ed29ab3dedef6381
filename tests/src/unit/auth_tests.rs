use super::{fixture, fixture_with_storage, session_json, user_json};
use mica_core::http::ApiError;
use mica_core::storage::LocalStore;
use serde_json::json;

#[tokio::test]
async fn login_survives_a_reload() {
    let storage = LocalStore::in_memory();
    let (state, transport) = fixture_with_storage(storage.clone());

    transport.enqueue_json(session_json("alice@example.com"));
    let user = state.auth.login("alice@example.com", "pw").await.expect("login");
    assert!(state.auth.is_authenticated());
    assert_eq!(state.auth.access_token().as_deref(), Some("access-1"));

    // Simulated page reload: a fresh state over the same storage, with the
    // stored token verified against the profile endpoint.
    let (reloaded, transport) = fixture_with_storage(storage);
    assert!(!reloaded.auth.is_authenticated());
    transport.enqueue_json(user_json("alice@example.com"));
    assert!(reloaded.initialize().await);
    assert_eq!(reloaded.auth.current_user(), Some(user));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, "/auth/me");
    assert_eq!(requests[0].bearer.as_deref(), Some("access-1"));
}

#[tokio::test]
async fn login_surfaces_the_server_detail() {
    let (state, transport) = fixture();
    transport.enqueue_error(ApiError::Status {
        status: 401,
        message: "invalid credentials".into(),
    });

    let err = state.auth.login("alice@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "invalid credentials");
    assert!(!state.auth.is_authenticated());
    assert_eq!(state.auth.access_token(), None);
}

#[tokio::test]
async fn empty_login_body_is_a_decode_failure() {
    let (state, transport) = fixture();
    transport.enqueue_empty();

    let err = state.auth.login("alice@example.com", "pw").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn register_and_google_login_store_the_session() {
    let (state, transport) = fixture();
    transport.enqueue_json(session_json("bob@example.com"));
    state
        .auth
        .register("bob@example.com", "pw", "Bob")
        .await
        .expect("register");
    assert!(state.auth.is_authenticated());
    state.logout();

    transport.enqueue_json(session_json("bob@example.com"));
    state.auth.google_login("google-id-token").await.expect("google login");
    assert!(state.auth.is_authenticated());

    let paths: Vec<_> = transport.requests().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/auth/register", "/auth/google"]);
}

#[tokio::test]
async fn refresh_failure_degrades_to_logged_out() {
    let (state, transport) = fixture();
    transport.enqueue_json(session_json("carol@example.com"));
    state.auth.login("carol@example.com", "pw").await.expect("login");

    transport.enqueue_error(ApiError::Status {
        status: 401,
        message: "refresh token expired".into(),
    });
    assert!(!state.auth.refresh().await);
    assert!(!state.auth.is_authenticated());
    assert_eq!(state.auth.access_token(), None);
}

#[tokio::test]
async fn rejected_token_triggers_exactly_one_refresh() {
    let storage = LocalStore::in_memory();
    let (state, transport) = fixture_with_storage(storage.clone());
    transport.enqueue_json(session_json("dave@example.com"));
    state.auth.login("dave@example.com", "pw").await.expect("login");

    let (reloaded, transport) = fixture_with_storage(storage);
    // /auth/me rejects, /auth/refresh succeeds with a new pair.
    transport.enqueue_error(ApiError::Status {
        status: 401,
        message: "token expired".into(),
    });
    transport.enqueue_json(json!({
        "access_token": "access-2",
        "refresh_token": "refresh-2",
        "user": user_json("dave@example.com")
    }));

    assert!(reloaded.initialize().await);
    assert_eq!(reloaded.auth.access_token().as_deref(), Some("access-2"));

    let paths: Vec<_> = transport.requests().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/auth/me", "/auth/refresh"]);
}

#[tokio::test]
async fn transport_failure_during_verification_also_refreshes() {
    let storage = LocalStore::in_memory();
    let (state, transport) = fixture_with_storage(storage.clone());
    transport.enqueue_json(session_json("erin@example.com"));
    state.auth.login("erin@example.com", "pw").await.expect("login");

    let (reloaded, transport) = fixture_with_storage(storage);
    transport.enqueue_error(ApiError::Transport("connection refused".into()));
    transport.enqueue_error(ApiError::Transport("connection refused".into()));

    assert!(!reloaded.initialize().await);
    assert!(!reloaded.auth.is_authenticated());
    assert_eq!(reloaded.auth.access_token(), None);
    assert_eq!(transport.request_count(), 2);
}

#[tokio::test]
async fn initialize_without_a_token_makes_no_request() {
    let (state, transport) = fixture();
    assert!(!state.initialize().await);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn logout_is_local_only() {
    let (state, transport) = fixture();
    transport.enqueue_json(session_json("frank@example.com"));
    state.auth.login("frank@example.com", "pw").await.expect("login");
    let before = transport.request_count();

    state.logout();
    assert!(!state.auth.is_authenticated());
    assert_eq!(state.auth.access_token(), None);
    assert_eq!(transport.request_count(), before);
}
