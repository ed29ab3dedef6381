use super::fixture;
use mica_core::http::ApiError;
use std::time::Duration;

#[tokio::test]
async fn failed_calls_surface_as_error_toasts() {
    let (state, transport) = fixture();
    transport.enqueue_error(ApiError::Status {
        status: 500,
        message: "storage unavailable".into(),
    });

    // The UI layer catches the error and raises the toast; errors hold the
    // longer duration.
    let err = state.auth.login("a@example.com", "pw").await.unwrap_err();
    let id = state.toasts.error("Login failed", Some(err.to_string()));

    let toast = state
        .toasts
        .toasts()
        .into_iter()
        .find(|t| t.id == id)
        .expect("toast");
    assert_eq!(toast.description.as_deref(), Some("storage unavailable"));
    assert_eq!(toast.duration, Duration::from_millis(120));
}

#[tokio::test]
async fn queue_stays_bounded_under_a_burst() {
    let (state, _transport) = fixture();
    for n in 0..10 {
        state.toasts.info(format!("update {n}"), None);
    }
    assert_eq!(state.toasts.toasts().len(), 3);
    // Oldest first out: the survivors are the newest three.
    let titles: Vec<_> = state
        .toasts
        .toasts()
        .iter()
        .map(|t| t.title.clone())
        .collect();
    assert_eq!(titles, vec!["update 7", "update 8", "update 9"]);
}

#[tokio::test]
async fn dispose_tears_down_pending_timers() {
    let (state, _transport) = fixture();
    state.toasts.success("saved", None);
    state.toasts.warning("slow network", None);
    state.dispose();
    assert!(state.toasts.toasts().is_empty());

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(state.toasts.toasts().is_empty());
}
