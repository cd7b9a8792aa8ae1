use crate::segment::SegmentOptions;
use crate::utils::today_session_id;
use log::warn;
use std::env;
use std::path::{Path, PathBuf};

pub const ENV_DIR: &str = "SHM_CHANNEL_DIR";
pub const ENV_SESSION: &str = "SHM_CHANNEL_SESSION";
pub const ENV_LOCK: &str = "SHM_CHANNEL_LOCK";

pub const DEFAULT_DIR: &str = "/dev/shm";

/// Where a registry keeps its segments and how it creates them.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub dir: PathBuf,
    /// Stamped into every segment this registry creates, normally the
    /// trading day as YYYYMMDD.
    pub session_id: i32,
    pub lock: bool,
    /// Pre-fault new segments by zeroing them, see `SegmentOptions::reset`.
    pub reset: bool,
}

impl RegistryConfig {
    pub fn new(dir: impl AsRef<Path>) -> RegistryConfig {
        return RegistryConfig {
            dir: dir.as_ref().to_path_buf(),
            session_id: today_session_id(),
            lock: false,
            reset: true,
        };
    }

    pub fn with_session_id(mut self, session_id: i32) -> Self {
        self.session_id = session_id;
        return self;
    }

    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        return self;
    }

    pub fn with_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        return self;
    }

    pub fn from_env() -> RegistryConfig {
        let dir = env::var(ENV_DIR).unwrap_or_else(|_| DEFAULT_DIR.to_string());
        let mut config = RegistryConfig::new(dir);

        if let Ok(value) = env::var(ENV_SESSION) {
            match value.trim().parse::<i32>() {
                Ok(session_id) => config.session_id = session_id,
                Err(_) => warn!("Ignoring {}={}, not a number", ENV_SESSION, value),
            }
        }
        if let Ok(value) = env::var(ENV_LOCK) {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => config.lock = true,
                "0" | "false" | "no" => config.lock = false,
                _ => warn!("Ignoring {}={}", ENV_LOCK, value),
            }
        }
        return config;
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        return self.dir.join(name);
    }

    pub fn segment_options(&self) -> SegmentOptions {
        return SegmentOptions {
            lock: self.lock,
            reset: self.reset,
        };
    }
}
