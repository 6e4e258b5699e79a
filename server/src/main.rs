//! Clonebox server binary.

use std::sync::Arc;

use anyhow::Context;
use clonebox_server::infrastructure::{audit, config::Settings, server, telemetry::TelemetryBuilder};
use clonebox_server::state::AppState;
use clonebox_server::vcs::GitCloner;
use clonebox_server::workspace::SessionStore;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Settings::new().context("Failed to load configuration")?;

    TelemetryBuilder::from_settings(&config.telemetry, env!("CARGO_PKG_VERSION"))
        .init()
        .context("Failed to initialize telemetry")?;

    info!("Clonebox starting...");
    audit::log_audit(&audit::AuditEvent::SystemStartup {
        component: "Server".into(),
    });

    let cloner = GitCloner::new(&config.cloning.git_binary);
    let store = SessionStore::open(&config.storage.root_dir, Arc::new(cloner), &config.cloning)
        .with_context(|| {
            format!(
                "Failed to open session root {}",
                config.storage.root_dir.display()
            )
        })?;

    if config.cors.is_unrestricted() {
        warn!("CORS allows every origin; set CLONEBOX__CORS__ALLOWED_ORIGINS to restrict it");
    }

    let state = Arc::new(AppState::new(store));
    server::run_server(&config, state, server::shutdown_signal()).await?;

    info!("Shutdown signal received, cleaning up...");
    audit::log_audit(&audit::AuditEvent::SystemShutdown {
        reason: "Signal received".into(),
    });

    info!("Clonebox shutdown complete.");
    Ok(())
}
