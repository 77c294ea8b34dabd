use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:5000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub nominatim_url: String,
    pub overpass_url: String,
    /// Nominatim rejects requests without an identifying User-Agent
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            user_agent: "footprint/0.1 (building footprint service)".to_string(),
            timeout_secs: 25,
        }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Shared HTTP client for both upstream services
    pub fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(&self.user_agent)
            // Overpass gets a few extra seconds to report its own timeout
            .timeout(self.timeout() + Duration::from_secs(5))
            .build()
            .context("Failed to create HTTP client")
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius around the geocoded point to fetch buildings from, in metres
    pub radius_m: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { radius_m: 50.0 }
    }
}

/// Search radii must be finite and positive; NaN or infinity would reach
/// the Overpass query as `around:NaN`
pub fn validate_radius(radius_m: f64) -> Result<f64> {
    if !(radius_m.is_finite() && radius_m > 0.0) {
        anyhow::bail!("radius must be a positive number of metres, got {}", radius_m);
    }
    Ok(radius_m)
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse config file")?;
        validate_radius(config.search.radius_m).context("Invalid search.radius_m")?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => Ok(Self::default()),
        }
    }
}
