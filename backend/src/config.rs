//! Configuration management for the Coffee Traceability & Quality Platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with CTQ__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Session token configuration
    pub auth: AuthConfig,

    /// Generative AI report configuration
    pub ai: AiConfig,

    /// Public traceability page configuration
    pub traceability: TraceabilityConfig,

    /// In-memory store configuration
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret key for signing session tokens
    pub session_secret: String,

    /// Session token lifetime in seconds
    pub session_ttl_secs: i64,

    /// bcrypt cost used when hashing passwords
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Base URL of the generateContent API
    pub endpoint: String,

    /// Model name
    pub model: String,

    /// API key; reports fall back to the mock generator when unset
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TraceabilityConfig {
    /// Base URL the public trace pages are served from
    pub public_base_url: String,

    /// QR image API (receives the page URL as `data`)
    pub qr_api_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Load demo farms, lots and sessions at startup
    pub seed_demo_data: bool,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_SESSION_SECRET: &str = "development-secret-key";
const DEFAULT_SESSION_TTL: i64 = 28800;
const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_AI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_AI_TIMEOUT: u64 = 30;
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_QR_API_URL: &str = "https://api.qrserver.com/v1/create-qr-code/";

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("CTQ__ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", DEFAULT_PORT)?
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("auth.session_secret", DEFAULT_SESSION_SECRET)?
            .set_default("auth.session_ttl_secs", DEFAULT_SESSION_TTL)?
            .set_default("auth.bcrypt_cost", DEFAULT_BCRYPT_COST)?
            .set_default("ai.endpoint", DEFAULT_AI_ENDPOINT)?
            .set_default("ai.model", DEFAULT_AI_MODEL)?
            .set_default("ai.timeout_secs", DEFAULT_AI_TIMEOUT)?
            .set_default("traceability.public_base_url", DEFAULT_PUBLIC_BASE_URL)?
            .set_default("traceability.qr_api_url", DEFAULT_QR_API_URL)?
            .set_default("store.seed_demo_data", true)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (CTQ__ prefix)
            .add_source(
                Environment::with_prefix("CTQ")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            auth: AuthConfig {
                session_secret: DEFAULT_SESSION_SECRET.to_string(),
                session_ttl_secs: DEFAULT_SESSION_TTL,
                bcrypt_cost: DEFAULT_BCRYPT_COST,
            },
            ai: AiConfig {
                endpoint: DEFAULT_AI_ENDPOINT.to_string(),
                model: DEFAULT_AI_MODEL.to_string(),
                api_key: None,
                timeout_secs: DEFAULT_AI_TIMEOUT,
            },
            traceability: TraceabilityConfig {
                public_base_url: DEFAULT_PUBLIC_BASE_URL.to_string(),
                qr_api_url: DEFAULT_QR_API_URL.to_string(),
            },
            store: StoreConfig {
                seed_demo_data: true,
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
        }
    }
}
