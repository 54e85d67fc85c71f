/// Current serialized catalog snapshot.
pub const SNAPSHOT: &str = "snapshot:current";

/// Migration progress marker in the meta tree.
pub const SCHEMA_VERSION: &str = "_meta:version";

pub fn snapshot_key() -> &'static [u8] {
    SNAPSHOT.as_bytes()
}

pub fn schema_version_key() -> &'static [u8] {
    SCHEMA_VERSION.as_bytes()
}
