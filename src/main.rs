use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use resource_catalog::catalog::CatalogStore;
use resource_catalog::config::Config;
use resource_catalog::logging::init_tracing;
use resource_catalog::routes::build_router;
use resource_catalog::state::AppState;
use resource_catalog::store::{MemoryGateway, PersistenceGateway, Store};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    if let Err(e) = init_tracing(&config.log_config()) {
        eprintln!("{e}");
        std::process::exit(1);
    }
    tracing::info!("Starting resource-catalog");

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Fatal startup error");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = open_gateway(&config)?;
    let catalog = Arc::new(CatalogStore::new(gateway));
    let initial = catalog.initialize();
    tracing::info!(
        grades = initial.grades.len(),
        subjects = initial.subjects.len(),
        "Catalog ready"
    );

    let state = AppState::new(Arc::clone(&catalog), &config);
    let app = build_router(state)
        .layer(build_cors_layer(&config)?)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and every AppState clone) is gone once serve returns.
    match Arc::try_unwrap(catalog) {
        Ok(catalog) => catalog.teardown()?,
        Err(_) => tracing::warn!("Catalog still shared at shutdown, skipping teardown flush"),
    }
    Ok(())
}

fn open_gateway(config: &Config) -> Result<Arc<dyn PersistenceGateway>, Box<dyn std::error::Error>> {
    if config.ephemeral_store {
        tracing::warn!("EPHEMERAL_STORE is set, catalog changes will not survive a restart");
        return Ok(Arc::new(MemoryGateway::new()));
    }

    if let Some(parent) = std::path::Path::new(&config.sled_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Store::open(&config.sled_path)?;
    store.run_migrations()?;
    tracing::info!(path = %config.sled_path, "Opened sled store");
    Ok(Arc::new(store))
}

fn build_cors_layer(config: &Config) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let headers = [header::CONTENT_TYPE, header::ACCEPT];

    if config.cors_origin.trim() == "*" {
        // Wildcard origin is for local development only.
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_headers(headers)
            .allow_methods(methods));
    }

    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        format!("Invalid CORS_ORIGIN '{}': {e}", config.cors_origin)
    })?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_headers(headers)
        .allow_methods(methods))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Cannot listen for SIGTERM, waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
