use crate::constants::SNAPSHOT_SCHEMA_VERSION;
use crate::store::keys;
use crate::store::{Store, StoreError};

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_stamp_snapshot_version", m002_stamp_snapshot_version),
    ]
}

/// Applies every migration newer than the recorded version.
///
/// Each migration must be idempotent: the process can stop after a migration
/// ran but before its version was recorded, and it will run again on the
/// next start. The recorded version only moves forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;

    for (index, (name, func)) in migrations().iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.meta.get(keys::schema_version_key())? {
        Some(raw) if raw.len() == 4 => {
            let bytes: [u8; 4] = raw.as_ref().try_into().unwrap_or([0; 4]);
            Ok(u32::from_be_bytes(bytes))
        }
        Some(raw) => {
            tracing::warn!(len = raw.len(), "Unexpected schema version encoding, assuming 0");
            Ok(0)
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .meta
        .insert(keys::schema_version_key(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Snapshots written before versioning carry no `schemaVersion`; stamp them so
/// later layout changes can tell them apart.
fn m002_stamp_snapshot_version(store: &Store) -> Result<(), StoreError> {
    let Some(raw) = store.catalog.get(keys::snapshot_key())? else {
        return Ok(());
    };

    let mut value: serde_json::Value = match serde_json::from_slice(&raw) {
        Ok(value) => value,
        Err(error) => {
            // Left in place; the catalog falls back to the seed when it cannot decode it.
            tracing::warn!(error = %error, "Stored snapshot is not valid JSON, leaving untouched");
            return Ok(());
        }
    };

    if let Some(root) = value.as_object_mut() {
        if root.contains_key("schemaVersion") {
            return Ok(());
        }
        root.insert(
            "schemaVersion".to_string(),
            serde_json::Value::from(SNAPSHOT_SCHEMA_VERSION),
        );
        store
            .catalog
            .insert(keys::snapshot_key(), serde_json::to_vec(&value)?)?;
    }

    Ok(())
}
