use crate::http::{ApiClient, ApiError};
use crate::notify::Notifier;
use crate::storage::{keys, LocalStore};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Current account identity, replaced wholesale on login, refresh and logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

/// Bearer-token session store.
///
/// The user record lives in memory; the token pair lives only in
/// [`LocalStore`] so a restarted client can resume the session through
/// [`AuthStore::initialize`]. `is_authenticated` is derived from the user,
/// never stored.
#[derive(Clone)]
pub struct AuthStore {
    inner: Arc<RwLock<AuthInner>>,
    api: ApiClient,
    storage: LocalStore,
    notifier: Notifier,
}

#[derive(Default)]
struct AuthInner {
    user: Option<User>,
}

impl AuthStore {
    pub fn new(api: ApiClient, storage: LocalStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(AuthInner::default())),
            api,
            storage,
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<()> {
        self.notifier.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.inner.read().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.read().user.is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.storage.get(keys::ACCESS_TOKEN)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let session: TokenResponse = self
            .api
            .post(
                "/auth/login",
                None,
                &json!({ "email": email, "password": password }),
            )
            .await?;
        Ok(self.store_session(session))
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, ApiError> {
        let session: TokenResponse = self
            .api
            .post(
                "/auth/register",
                None,
                &json!({ "email": email, "password": password, "name": name }),
            )
            .await?;
        Ok(self.store_session(session))
    }

    pub async fn google_login(&self, id_token: &str) -> Result<User, ApiError> {
        let session: TokenResponse = self
            .api
            .post("/auth/google", None, &json!({ "id_token": id_token }))
            .await?;
        Ok(self.store_session(session))
    }

    /// Exchange the stored refresh token for a new pair. Any failure degrades
    /// to logged-out; this never returns an error.
    pub async fn refresh(&self) -> bool {
        let Some(refresh_token) = self.storage.get::<String>(keys::REFRESH_TOKEN) else {
            self.clear_session();
            return false;
        };
        let renewed: Result<TokenResponse, ApiError> = self
            .api
            .post("/auth/refresh", None, &json!({ "refresh_token": refresh_token }))
            .await;
        match renewed {
            Ok(session) => {
                self.store_session(session);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "token refresh failed, dropping session");
                self.clear_session();
                false
            }
        }
    }

    /// Clear tokens and user unconditionally. No network call.
    pub fn logout(&self) {
        self.clear_session();
    }

    /// Mount-time session check: verify a stored access token against the
    /// profile endpoint; any failure gets exactly one refresh attempt.
    pub async fn initialize(&self) -> bool {
        let Some(token) = self.access_token() else {
            return false;
        };
        match self.api.get::<User>("/auth/me", Some(&token)).await {
            Ok(user) => {
                self.inner.write().user = Some(user);
                self.notifier.notify();
                true
            }
            Err(err) => {
                tracing::debug!(%err, "stored access token rejected, attempting refresh");
                self.refresh().await
            }
        }
    }

    fn store_session(&self, session: TokenResponse) -> User {
        self.storage.set(keys::ACCESS_TOKEN, &session.access_token);
        self.storage.set(keys::REFRESH_TOKEN, &session.refresh_token);
        self.inner.write().user = Some(session.user.clone());
        self.notifier.notify();
        session.user
    }

    fn clear_session(&self) {
        self.storage.remove(keys::ACCESS_TOKEN);
        self.storage.remove(keys::REFRESH_TOKEN);
        self.inner.write().user = None;
        self.notifier.notify();
    }
}
