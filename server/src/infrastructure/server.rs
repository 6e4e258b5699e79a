use crate::api::session_routes;
use crate::infrastructure::config::{CorsSettings, Settings};
use crate::state::AppState;
use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::future::Future;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builds the CORS layer for the configured origins.
///
/// # Errors
///
/// Returns an error if an origin is not a valid header value.
pub fn cors_layer(settings: &CorsSettings) -> anyhow::Result<CorsLayer> {
    let origin = if settings.is_unrestricted() {
        AllowOrigin::from(Any)
    } else {
        let origins = settings
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid CORS origin '{origin}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any))
}

/// Assembles the full application router.
///
/// `metrics` mounts `/metrics` when a Prometheus recorder is installed.
pub fn build_router(
    state: Arc<AppState>,
    cors: CorsLayer,
    metrics: Option<PrometheusHandle>,
) -> Router {
    let mut app = session_routes();
    if let Some(handle) = metrics {
        app = app.route("/metrics", get(move || std::future::ready(handle.render())));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Runs the HTTP server until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters an error while running.
pub async fn run_server(
    config: &Settings,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {e}"))?;

    let app = build_router(state, cors_layer(&config.cors)?, Some(handle));

    let addr = config.server.bind_address()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("Clonebox listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
///
/// # Panics
///
/// Panics if the signal handlers cannot be installed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrestricted_and_listed_origins_build() -> anyhow::Result<()> {
        let _unrestricted = cors_layer(&CorsSettings::default())?;
        let _listed = cors_layer(&CorsSettings {
            allowed_origins: vec!["https://app.example.com".to_string()],
        })?;
        Ok(())
    }

    #[test]
    fn invalid_origin_is_rejected() {
        let result = cors_layer(&CorsSettings {
            allowed_origins: vec!["https://bad\norigin".to_string()],
        });
        assert!(result.is_err());
    }
}
