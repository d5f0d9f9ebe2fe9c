//! Traced demo service.
//!
//! Composition root showing the one-call registration every service performs:
//!
//! ```text
//! config → logging → ServiceName::resolve → TraceSink::from_config
//!        → RequestTracer → build routes → registrar::install → serve
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{Method, Uri},
    routing::get,
    Json, Router,
};
use clap::Parser;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use request_tracer::config::{load_config, TracerConfig};
use request_tracer::identity::{EnvSource, LayeredSource, PropertySource, SERVICE_NAME_KEY};
use request_tracer::observability::logging;
use request_tracer::tracer::key_source;
use request_tracer::{registrar, PathFilter, RequestTracer, ServiceName, TraceSink};

#[derive(Parser)]
#[command(name = "request-tracer")]
#[command(about = "HTTP service instrumented with request boundary tracing", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured service name.
    #[arg(long)]
    service_name: Option<String>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TracerConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }

    logging::init(&config.observability)?;
    tracing::info!("request-tracer v{} starting", env!("CARGO_PKG_VERSION"));

    let mut overrides = PropertySource::new();
    if let Some(name) = &cli.service_name {
        overrides = overrides.with(SERVICE_NAME_KEY, name.clone());
    }
    let source = LayeredSource::new()
        .push(overrides)
        .push(EnvSource::from_env())
        .push(PropertySource::from_config(&config));
    let service = ServiceName::resolve(&source);

    let sink = TraceSink::from_config(&config.sink);
    let tracer = RequestTracer::new(service.clone(), sink)
        .with_key_source(key_source(config.tracing.context_key));
    let filter = PathFilter::from_config(&config.tracing)?;

    tracing::info!(
        service = %service,
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let app = build_app(&config);
    let app = registrar::install(app, Arc::new(tracer), filter).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Business routes. Timeouts sit inside the tracer so timed-out requests
/// still report their response status.
#[allow(deprecated)]
fn build_app(config: &TracerConfig) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders/{id}", get(get_order))
        .fallback(echo)
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}

async fn get_order(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id, "status": "CREATED" }))
}

async fn echo(method: Method, uri: Uri) -> String {
    format!("{} {}", method, uri.path())
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
