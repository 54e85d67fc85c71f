use std::sync::Arc;
use std::time::Instant;

use crate::catalog::CatalogStore;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    catalog: Arc<CatalogStore>,
    config: Arc<Config>,
    started_at: Instant,
}

impl AppState {
    pub fn new(catalog: Arc<CatalogStore>, config: &Config) -> Self {
        Self {
            catalog,
            config: Arc::new(config.clone()),
            started_at: Instant::now(),
        }
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
