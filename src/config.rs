// src/config.rs
use log::warn;
use std::env;
use std::time::Duration;

use crate::error::{DashboardError, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8001";
pub const API_PREFIX: &str = "/api";
pub const DEFAULT_PORT: u16 = 3030;
pub const DEFAULT_PACING_MS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend origin; every endpoint path is appended under `/api`.
    pub api_url: String,
    pub port: u16,
    /// Gap between consecutive requests of a generate-all sequence.
    pub pacing: Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            api_url: DEFAULT_API_URL.to_string(),
            port: DEFAULT_PORT,
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("DASHBOARD_API_URL").unwrap_or_else(|_| {
            warn!("$DASHBOARD_API_URL not set, defaulting to {}", DEFAULT_API_URL);
            DEFAULT_API_URL.to_string()
        });

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| DashboardError::Config(format!("PORT must be a number, got '{}'", raw)))?,
            Err(_) => {
                warn!("$PORT not set, defaulting to {}", DEFAULT_PORT);
                DEFAULT_PORT
            }
        };

        let pacing_ms = match env::var("GENERATION_PACING_MS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                DashboardError::Config(format!("GENERATION_PACING_MS must be a number, got '{}'", raw))
            })?,
            Err(_) => DEFAULT_PACING_MS,
        };

        Ok(DashboardConfig {
            api_url: normalize_base_url(&api_url),
            port,
            pacing: Duration::from_millis(pacing_ms),
        })
    }

    pub fn with_api_url(mut self, api_url: impl AsRef<str>) -> Self {
        self.api_url = normalize_base_url(api_url.as_ref());
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Strips trailing slashes so paths can be appended verbatim.
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_removed() {
        assert_eq!(normalize_base_url("http://api.local:8001/"), "http://api.local:8001");
        assert_eq!(normalize_base_url(" http://api.local// "), "http://api.local");
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = DashboardConfig::default()
            .with_api_url("http://127.0.0.1:9000/")
            .with_pacing(Duration::from_millis(5));
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.pacing, Duration::from_millis(5));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
