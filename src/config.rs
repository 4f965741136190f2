//! Configuration management.
//!
//! Everything comes from the environment (with `.env` support via dotenvy)
//! and is resolved once at startup; nothing re-reads the environment per
//! call. The mock-vs-real store split is a single `PROMOTION_STORE` switch.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Development fallback only. Every deployed environment must supply its
/// own `QR_TOKEN_SECRET`.
pub const DEV_TOKEN_SECRET: &str = "brewpass-dev-secret-do-not-deploy";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub token: TokenConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Symmetric signing secret, one per deployment environment. Never
    /// rotated at runtime.
    pub secret: String,
    pub min_lifetime_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub mode: StoreMode,
    pub remote_base_url: String,
    pub remote_api_key: Option<String>,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreMode {
    Memory,
    Remote,
}

impl FromStr for StoreMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "memory" | "mock" => Ok(StoreMode::Memory),
            "remote" | "real" => Ok(StoreMode::Remote),
            other => Err(anyhow::anyhow!("unknown promotion store mode: {other}")),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            app: AppConfig {
                environment: env::var("ENVIRONMENT")
                    .unwrap_or_else(|_| "development".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()?,
            },
            token: TokenConfig {
                secret: env::var("QR_TOKEN_SECRET")
                    .unwrap_or_else(|_| DEV_TOKEN_SECRET.to_string()),
                min_lifetime_seconds: env::var("QR_TOKEN_MIN_LIFETIME_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()?,
            },
            store: StoreConfig {
                mode: env::var("PROMOTION_STORE")
                    .unwrap_or_else(|_| "memory".to_string())
                    .parse()?,
                remote_base_url: env::var("PROMOTION_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8003".to_string()),
                remote_api_key: env::var("PROMOTION_API_KEY").ok(),
                request_timeout_seconds: env::var("PROMOTION_API_TIMEOUT_SECONDS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
            },
        })
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }
}
