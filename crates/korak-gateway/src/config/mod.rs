//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use korak_core::error::{KorakError, Result};

pub use schema::{EmailSection, GatewayConfig, MetricsSection, ServerSection};

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "KORAK_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "korak.yaml";

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| KorakError::Config(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_yaml::from_str(s)
        .map_err(|e| KorakError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load from `$KORAK_CONFIG`, else `korak.yaml` if present, else defaults.
pub fn load_default() -> Result<GatewayConfig> {
    match std::env::var(CONFIG_PATH_ENV) {
        Ok(path) => load_from_file(&path),
        Err(_) if std::path::Path::new(DEFAULT_CONFIG_PATH).exists() => {
            load_from_file(DEFAULT_CONFIG_PATH)
        }
        Err(_) => {
            tracing::info!("no config file found; using built-in defaults");
            let cfg = GatewayConfig::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }
}
