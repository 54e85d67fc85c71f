use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use resource_catalog::catalog::CatalogStore;
use resource_catalog::config::Config;
use resource_catalog::routes::build_router;
use resource_catalog::state::AppState;
use resource_catalog::store::{MemoryGateway, Store};

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub catalog: Arc<CatalogStore>,
    pub config: Config,
    _temp_dir: TempDir,
}

fn test_config(sled_path: String, ephemeral_store: bool) -> Config {
    // Built directly: set_var would race between parallel tests.
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        ephemeral_store,
        cors_origin: "http://localhost:5173".to_string(),
    }
}

fn assemble(catalog: Arc<CatalogStore>, config: Config, temp_dir: TempDir) -> TestApp {
    catalog.initialize();
    let state = AppState::new(Arc::clone(&catalog), &config);
    let app = build_router(state.clone());
    TestApp {
        app,
        state,
        catalog,
        config,
        _temp_dir: temp_dir,
    }
}

/// Router over a fresh sled store in a temp directory.
pub async fn spawn_test_app() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("catalog-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string(), false);

    let store = Store::open(&config.sled_path).expect("open store");
    store.run_migrations().expect("run migrations");
    let catalog = Arc::new(CatalogStore::new(Arc::new(store)));
    assemble(catalog, config, temp_dir)
}

/// Router over an in-memory gateway the test keeps a handle to.
pub async fn spawn_with_gateway(gateway: Arc<MemoryGateway>) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let config = test_config(String::new(), true);
    let catalog = Arc::new(CatalogStore::new(gateway));
    assemble(catalog, config, temp_dir)
}
