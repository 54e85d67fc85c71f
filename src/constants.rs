/// Maximum number of entries kept in the activity log (newest first).
pub const ACTIVITY_LOG_CAP: usize = 50;

/// School recorded on a paper when the uploader did not name one.
pub const UNKNOWN_SCHOOL: &str = "Unknown School";

/// Current version of the exported snapshot layout.
/// Snapshots without a version field are treated as version 0.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_SITE_NAME: &str = "Teaching Torch";

/// Canonical term keys; every fresh bundle carries all three, empty.
pub const TERM_KEYS: [&str; 3] = ["term1", "term2", "term3"];

pub const MSG_DATA_EXPORTED: &str = "Data exported successfully";
pub const MSG_DATA_IMPORTED: &str = "Data imported successfully";
