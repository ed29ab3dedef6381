use anyhow::Result;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

static SUBSCRIBER_GUARD: OnceLock<()> = OnceLock::new();

/// Filter applied when `RUST_LOG` is not set: the store layer at debug,
/// everything else at info.
const DEFAULT_DIRECTIVES: &str = "info,mica_core=debug";

/// Install the global tracing subscriber for the Mica workspace with an
/// explicit filter. Idempotent: later calls (from tests or a second binary
/// entry point) are no-ops.
pub fn init_tracing(filter: EnvFilter) -> Result<()> {
    if SUBSCRIBER_GUARD.get().is_some() {
        return Ok(());
    }

    let subscriber = Registry::default().with(filter).with(fmt::layer());
    tracing::subscriber::set_global_default(subscriber)?;
    SUBSCRIBER_GUARD.set(()).ok();

    Ok(())
}

/// Install the subscriber honoring `RUST_LOG`, falling back to the workspace
/// defaults when the variable is absent or unparsable.
pub fn init_default_tracing() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    init_tracing(filter)
}
