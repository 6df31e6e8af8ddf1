pub mod handlers;
pub mod state;
pub mod url_validation;

use std::sync::OnceLock;

use axum::{
    Router,
    routing::{get, post},
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use state::AppState;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::Config;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder at most once per process. Tests
/// that build multiple routers in the same process would otherwise panic
/// on the second `install_recorder()` call.
fn prometheus_handle() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder");
            info!("Prometheus metrics recorder installed");
            handle
        })
        .clone()
}

/// Build the application router over a fresh `AppState`. Split out from
/// `start` so integration tests can stand up a real server on an ephemeral
/// port without going through `main`.
pub async fn build_router(config: Config) -> Router {
    let state = AppState::new(config).await;

    // CORS is permissive: the playlist/segment endpoints must be reachable
    // from any web player origin (HLS.js, video.js, etc).
    info!("CORS: permissive mode (required for HLS player access)");
    let cors = CorsLayer::very_permissive();

    let prometheus_handle = prometheus_handle();

    Router::new()
        .route("/", get(handlers::health::health_check))
        .route("/health", get(handlers::health::health_check))
        .route(
            "/metrics",
            get({
                let handle = prometheus_handle.clone();
                move || handlers::metrics::serve_metrics(handle)
            }),
        )
        .route("/api/v1/videos/process", post(handlers::videos::process_video))
        .route("/api/v1/videos/status/{job_id}", get(handlers::videos::video_status))
        .route("/api/v1/videos/playlist/{job_id_m3u8}", get(handlers::videos::video_playlist))
        .route("/api/v1/videos/segments/{job_id}/{name}", get(handlers::videos::video_segment))
        .route("/api/v1/analytics/{kind}", post(handlers::analytics::record_event))
        .route("/api/v1/profile/analyze", post(handlers::profile::analyze_profile))
        .layer(cors)
        .with_state(state)
}

/// Start the Axum HTTP server.
pub async fn start(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let base_url = config.base_url.clone();

    let app = build_router(config).await;

    let addr = format!("0.0.0.0:{port}");
    let listener = match tokio::net::TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("failed to bind to {addr}: {e}. Is port {port} already in use?");
            return Err(e.into());
        }
    };

    info!("server bound to {addr}");
    info!("public URL: {base_url}");
    info!("  health:  {base_url}/health");
    info!("  metrics: {base_url}/metrics");

    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        error!("server error: {e}");
        return Err(e.into());
    }

    info!("server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
