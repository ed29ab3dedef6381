use anyhow::Result;
use clap::{Parser, Subcommand};
use mica_core::http::mock::MockTransport;
use mica_core::http::ApiTransport;
use mica_core::library::LibraryDraft;
use mica_core::projects::MessageRole;
use mica_core::storage::LocalStore;
use mica_core::telemetry;
use mica_core::toast::ToastConfig;
use mica_core::{ApiClient, AppState};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "xtask", version, about = "Automation helpers for Mica")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a lightweight smoke test that exercises the Mica store stack
    /// against a scripted transport.
    Smoke,
}

fn main() -> Result<()> {
    telemetry::init_default_tracing()?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Smoke => smoke_test(),
    }
}

fn smoke_test() -> Result<()> {
    let runtime = Runtime::new()?;
    let temp_dir = TempDir::new()?;
    let transport = Arc::new(MockTransport::new());
    let state = AppState::with_parts(
        LocalStore::new(temp_dir.path().to_path_buf()),
        ApiClient::new(transport.clone() as Arc<dyn ApiTransport>),
        ToastConfig::default(),
    );

    transport.enqueue_json(json!({
        "access_token": "smoke-access",
        "refresh_token": "smoke-refresh",
        "user": {
            "id": "smoke-user",
            "email": "smoke@example.com",
            "name": "Smoke Tester",
            "created_at": "2026-01-01T00:00:00Z"
        }
    }));
    runtime.block_on(state.auth.login("smoke@example.com", "smoke"))?;

    let project = state.projects.create_project(Some("Scout a pop-up location in Lisbon"));
    state.projects.add_message(project, MessageRole::User, "Scout a pop-up location in Lisbon");
    state.projects.add_message(project, MessageRole::Assistant, "Here are three candidates.");

    state.library.add_item(LibraryDraft {
        category: "store".into(),
        store_name: "Rua Augusta Pop-up".into(),
        goal: "short-term lease".into(),
        project_name: state.projects.project(project).map(|p| p.name),
        data: json!({"rating": 4}),
    });

    transport.enqueue_json(json!([]));
    runtime.block_on(state.folders.fetch_folders())?;

    runtime.block_on(async {
        state.toasts.success("Smoke test complete", None);
    });

    info!(
        projects = state.projects.projects().len(),
        library_items = state.library.items().len(),
        requests = transport.request_count(),
        "smoke run finished"
    );
    state.dispose();

    Ok(())
}
