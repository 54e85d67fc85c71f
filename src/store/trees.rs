pub const CATALOG: &str = "catalog";
pub const META: &str = "meta";
