use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
const DEFAULT_CELEBRATION_MS: u64 = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval_ms: u64,
    pub celebration_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: std::env::var("TRIPWEAVER_API_URL").unwrap_or(defaults.api_base_url),
            poll_interval_ms: std::env::var("TRIPWEAVER_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.poll_interval_ms),
            celebration_ms: std::env::var("TRIPWEAVER_CELEBRATION_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.celebration_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn celebration_duration(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            celebration_ms: DEFAULT_CELEBRATION_MS,
        }
    }
}
