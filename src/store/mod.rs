pub mod gateway;
pub mod keys;
pub mod migrate;
pub mod trees;

use sled::Db;
use thiserror::Error;

pub use gateway::{MemoryGateway, PersistenceGateway};

/// sled-backed persistence for the catalog snapshot.
#[derive(Debug)]
pub struct Store {
    db: Db,
    pub catalog: sled::Tree,
    pub meta: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("write rejected: {0}")]
    WriteRejected(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        Self::from_db(sled::open(sled_path)?)
    }

    fn from_db(db: Db) -> Result<Self, StoreError> {
        let catalog = db.open_tree(trees::CATALOG)?;
        let meta = db.open_tree(trees::META)?;
        Ok(Self { db, catalog, meta })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }
}

impl PersistenceGateway for Store {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.catalog.get(keys::snapshot_key())?.map(|raw| raw.to_vec()))
    }

    fn save(&self, payload: &[u8]) -> Result<(), StoreError> {
        self.catalog.insert(keys::snapshot_key(), payload)?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        Store::flush(self)
    }
}
