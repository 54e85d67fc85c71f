use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    /// Keep the catalog in process memory only; nothing touches disk.
    pub ephemeral_store: bool,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/catalog.sled"),
            ephemeral_store: env_or_bool("EPHEMERAL_STORE", false),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
        }
    }

    pub fn log_config(&self) -> crate::logging::LogConfig {
        crate::logging::LogConfig {
            log_level: self.log_level.clone(),
            enable_file_logs: self.enable_file_logs,
            log_dir: self.log_dir.clone(),
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => {
                tracing::warn!(key, value = %raw, "Unrecognized boolean env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &["HOST", "PORT", "RUST_LOG", "SLED_PATH", "EPHEMERAL_STORE"]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.sled_path, "./data/catalog.sled");
        assert!(!cfg.ephemeral_store);
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("EPHEMERAL_STORE", "maybe");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert!(!cfg.ephemeral_store);
        clear_keys(managed_keys());
    }

    #[test]
    fn ephemeral_flag_is_read() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("EPHEMERAL_STORE", "on");
        env::set_var("PORT", "4100");

        let cfg = Config::from_env();
        assert!(cfg.ephemeral_store);
        assert_eq!(cfg.port, 4100);
        clear_keys(managed_keys());
    }
}
