use crate::auth::AuthStore;
use crate::config::Settings;
use crate::folders::FolderStore;
use crate::http::{ApiClient, ApiTransport, HttpTransport};
use crate::library::LibraryStore;
use crate::projects::ProjectStore;
use crate::storage::LocalStore;
use crate::toast::{ToastConfig, ToastStore};
use std::sync::Arc;

/// The five client stores, wired to one storage root and one API transport.
///
/// `new` builds the reqwest transport from [`Settings`]; tests and smoke runs
/// inject a transport through `with_transport` or assemble the parts
/// directly. Lifecycle is explicit: construct, [`initialize`](Self::initialize)
/// once, [`dispose`](Self::dispose) on teardown.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthStore,
    pub projects: ProjectStore,
    pub folders: FolderStore,
    pub library: LibraryStore,
    pub toasts: ToastStore,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        let transport: Arc<dyn ApiTransport> =
            Arc::new(HttpTransport::new(settings.api_base_url.clone()));
        Self::with_transport(settings, transport)
    }

    pub fn with_transport(settings: &Settings, transport: Arc<dyn ApiTransport>) -> Self {
        Self::with_parts(
            LocalStore::new(settings.data_dir.clone()),
            ApiClient::new(transport),
            ToastConfig::default(),
        )
    }

    pub fn with_parts(storage: LocalStore, api: ApiClient, toast_config: ToastConfig) -> Self {
        let auth = AuthStore::new(api.clone(), storage.clone());
        let folders = FolderStore::new(api, auth.clone());
        Self {
            auth,
            projects: ProjectStore::new(storage.clone()),
            folders,
            library: LibraryStore::new(storage),
            toasts: ToastStore::new(toast_config),
        }
    }

    /// Mount-time session restore. When the stored session cannot be
    /// restored, folder state is cleared along with it.
    pub async fn initialize(&self) -> bool {
        let restored = self.auth.initialize().await;
        if !restored {
            self.folders.clear();
        }
        restored
    }

    /// Log out and drop everything derived from the session.
    pub fn logout(&self) {
        self.auth.logout();
        self.folders.clear();
    }

    /// Teardown: cancel all pending toast timers.
    pub fn dispose(&self) {
        self.toasts.dispose();
    }
}
