use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_KEEPALIVE_SECS: u64 = 25;
pub const DEFAULT_ROUTE_CACHE_TTL_SECS: u64 = 120;

/// Relay configuration sourced from environment variables.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    pub metrics_bind: SocketAddr,
    pub ingest_token: String,
    pub keepalive_secs: u64,
    pub static_dir: Option<PathBuf>,
    pub route_api_url: Option<String>,
    pub route_cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
struct RelayConfigOverride {
    bind_addr: Option<String>,
    metrics_bind: Option<String>,
    ingest_token: Option<String>,
    keepalive_secs: Option<u64>,
    static_dir: Option<PathBuf>,
    route_api_url: Option<String>,
    route_cache_ttl_secs: Option<u64>,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let bind_addr = std::env::var("SKYFEED_BIND")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .with_context(|| "parse SKYFEED_BIND")?;
        let metrics_bind = std::env::var("SKYFEED_METRICS_BIND")
            .unwrap_or_else(|_| "0.0.0.0:9090".to_string())
            .parse()
            .with_context(|| "parse SKYFEED_METRICS_BIND")?;
        let ingest_token =
            std::env::var("SKYFEED_TOKEN").with_context(|| "SKYFEED_TOKEN must be set")?;
        let keepalive_secs = parse_optional_secs("SKYFEED_KEEPALIVE_SECS")?
            .unwrap_or(DEFAULT_KEEPALIVE_SECS);
        let static_dir = std::env::var("SKYFEED_STATIC_DIR").ok().map(PathBuf::from);
        let route_api_url = std::env::var("SKYFEED_ROUTE_API_URL").ok();
        let route_cache_ttl_secs = parse_optional_secs("SKYFEED_ROUTE_CACHE_TTL_SECS")?
            .unwrap_or(DEFAULT_ROUTE_CACHE_TTL_SECS);
        Ok(Self {
            bind_addr,
            metrics_bind,
            ingest_token,
            keepalive_secs,
            static_dir,
            route_api_url,
            route_cache_ttl_secs,
        })
    }

    pub fn from_env_or_yaml() -> Result<Self> {
        let mut config = Self::from_env()?;
        if let Ok(path) = std::env::var("SKYFEED_CONFIG") {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("read SKYFEED_CONFIG: {path}"))?;
            let override_cfg: RelayConfigOverride =
                serde_yaml::from_str(&contents).with_context(|| "parse relay config yaml")?;
            if let Some(value) = override_cfg.bind_addr {
                config.bind_addr = value.parse().with_context(|| "parse bind_addr")?;
            }
            if let Some(value) = override_cfg.metrics_bind {
                config.metrics_bind = value.parse().with_context(|| "parse metrics_bind")?;
            }
            if let Some(value) = override_cfg.ingest_token {
                config.ingest_token = value;
            }
            if let Some(value) = override_cfg.keepalive_secs {
                config.keepalive_secs = value;
            }
            if let Some(value) = override_cfg.static_dir {
                config.static_dir = Some(value);
            }
            if let Some(value) = override_cfg.route_api_url {
                config.route_api_url = Some(value);
            }
            if let Some(value) = override_cfg.route_cache_ttl_secs {
                config.route_cache_ttl_secs = value;
            }
        }
        Ok(config)
    }

    pub fn keepalive(&self) -> Duration {
        Duration::from_secs(self.keepalive_secs)
    }

    pub fn route_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.route_cache_ttl_secs)
    }
}

fn parse_optional_secs(var: &str) -> Result<Option<u64>> {
    std::env::var(var)
        .ok()
        .map(|value| value.parse().with_context(|| format!("parse {var}")))
        .transpose()
}
