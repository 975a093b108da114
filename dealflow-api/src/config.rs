//! API Configuration Module
//!
//! Configuration for CORS, the record store backend and email generation.
//! Everything is loaded from environment variables with defaults suited to
//! local development (in-memory store, in-process generator).

use dealflow_core::ConfigError;
use dealflow_llm::providers::openai::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use std::path::PathBuf;
use std::time::Duration;

/// Default bound on a single email-draft generation call.
pub const DEFAULT_EMAIL_TIMEOUT_MS: u64 = 30_000;

/// Default bound on a single provider HTTP request.
pub const DEFAULT_OPENAI_TIMEOUT_MS: u64 = 25_000;

/// Default bound on a single record store HTTP request.
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 15_000;

// ============================================================================
// API CONFIGURATION
// ============================================================================

/// API configuration for CORS.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    /// Whether to allow credentials in CORS requests.
    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `DEALFLOW_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `DEALFLOW_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `DEALFLOW_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("DEALFLOW_CORS_ORIGINS")
            .ok()
            .map(|s| split_origins(&s))
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("DEALFLOW_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("DEALFLOW_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
        }
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.cors_origins.is_empty() || self.cors_origins.iter().any(|allowed| allowed == origin)
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

// ============================================================================
// RECORD STORE CONFIGURATION
// ============================================================================

/// Which record store backs the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process store, optionally seeded from a JSON file.
    Memory { seed_path: Option<PathBuf> },
    /// Hosted record store reached over HTTP.
    Http {
        base_url: String,
        api_key: String,
        timeout: Duration,
    },
}

impl StoreBackend {
    /// Environment variables:
    /// - `DEALFLOW_STORE_BACKEND`: "memory" (default) or "http"
    /// - `DEALFLOW_SEED_PATH`: JSON seed file for the memory backend
    /// - `DEALFLOW_STORE_URL`: base URL, required for "http"
    /// - `DEALFLOW_STORE_KEY`: bearer project key for "http"
    /// - `DEALFLOW_STORE_TIMEOUT_MS`: request timeout (default: 15000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = std::env::var("DEALFLOW_STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .trim()
            .to_lowercase();

        match backend.as_str() {
            "" | "memory" => Ok(StoreBackend::Memory {
                seed_path: non_blank_var("DEALFLOW_SEED_PATH").map(PathBuf::from),
            }),
            "http" => {
                let base_url = non_blank_var("DEALFLOW_STORE_URL").ok_or_else(|| {
                    ConfigError::MissingRequired {
                        field: "DEALFLOW_STORE_URL".to_string(),
                    }
                })?;
                let timeout_ms = std::env::var("DEALFLOW_STORE_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_STORE_TIMEOUT_MS);
                Ok(StoreBackend::Http {
                    base_url,
                    api_key: std::env::var("DEALFLOW_STORE_KEY").unwrap_or_default(),
                    timeout: Duration::from_millis(timeout_ms),
                })
            }
            other => Err(ConfigError::InvalidValue {
                field: "DEALFLOW_STORE_BACKEND".to_string(),
                value: other.to_string(),
                reason: "expected memory or http".to_string(),
            }),
        }
    }
}

// ============================================================================
// EMAIL GENERATION CONFIGURATION
// ============================================================================

/// Provider and email-draft client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_timeout: Duration,
    /// Remote generator function. `None` runs the generator in-process.
    pub function_url: Option<String>,
    /// Bound on one generation as seen by the deal orchestrator.
    pub draft_timeout: Duration,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_timeout: Duration::from_millis(DEFAULT_OPENAI_TIMEOUT_MS),
            function_url: None,
            draft_timeout: Duration::from_millis(DEFAULT_EMAIL_TIMEOUT_MS),
        }
    }
}

impl EmailConfig {
    /// Environment variables:
    /// - `DEALFLOW_OPENAI_BASE_URL` (default: https://api.openai.com/v1)
    /// - `DEALFLOW_OPENAI_MODEL` (default: gpt-3.5-turbo)
    /// - `DEALFLOW_OPENAI_TIMEOUT_MS` (default: 25000)
    /// - `DEALFLOW_EMAIL_FUNCTION_URL`: remote generator (default: in-process)
    /// - `DEALFLOW_EMAIL_TIMEOUT_MS` (default: 30000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            openai_base_url: non_blank_var("DEALFLOW_OPENAI_BASE_URL")
                .unwrap_or(defaults.openai_base_url),
            openai_model: non_blank_var("DEALFLOW_OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_timeout: std::env::var("DEALFLOW_OPENAI_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.openai_timeout),
            function_url: non_blank_var("DEALFLOW_EMAIL_FUNCTION_URL"),
            draft_timeout: std::env::var("DEALFLOW_EMAIL_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.draft_timeout),
        }
    }
}

fn non_blank_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
