mod app_state;
mod config;
mod models;
mod routes;
mod services;

use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use services::backend::BackendApi;

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing astro-admin gateway");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!(
        "backend_requests_total",
        "Order queries and batch submissions sent to the platform backend"
    );
    metrics::describe_counter!(
        "backend_request_failures_total",
        "Backend replies with a non-success status"
    );
    metrics::describe_histogram!(
        "backend_request_seconds",
        "Latency of platform backend calls"
    );
    metrics::describe_counter!(
        "selection_previews_total",
        "Selection previews served to operators"
    );
    metrics::describe_counter!(
        "selection_previews_superseded_total",
        "Selection previews discarded because a newer request arrived"
    );
    metrics::describe_counter!(
        "report_batches_submitted_total",
        "Report batches accepted by the backend"
    );
    metrics::describe_counter!(
        "report_batches_failed_total",
        "Report batch submissions that failed"
    );

    // Initialize the platform backend client
    tracing::info!(backend = %config.backend_base_url, "Initializing backend client");
    let backend = BackendApi::new(&config).expect("Failed to initialize backend client");

    // Create shared application state
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(backend, config);

    // Build routes and middleware
    let app = routes::router(state, Some(prometheus_handle));

    tracing::info!("Starting astro-admin on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
