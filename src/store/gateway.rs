use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::store::StoreError;

/// Durable home of the serialized catalog. The catalog treats the payload as
/// an opaque blob: one read at startup, one write after every mutation.
pub trait PersistenceGateway: Send + Sync {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError>;

    fn save(&self, payload: &[u8]) -> Result<(), StoreError>;

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Process-local gateway for ephemeral runs (`EPHEMERAL_STORE=true`) and tests.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    blob: Mutex<Option<Vec<u8>>>,
    reject_writes: AtomicBool,
    saves: AtomicU64,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Mutex::new(Some(payload.into())),
            ..Self::default()
        }
    }

    /// Makes every following `save` fail until switched back.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::Relaxed);
    }

    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    pub fn payload(&self) -> Option<Vec<u8>> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn load(&self) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.payload())
    }

    fn save(&self, payload: &[u8]) -> Result<(), StoreError> {
        if self.reject_writes.load(Ordering::Relaxed) {
            return Err(StoreError::WriteRejected(
                "memory gateway is rejecting writes".to_string(),
            ));
        }
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(payload.to_vec());
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
