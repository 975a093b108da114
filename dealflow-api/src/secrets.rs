//! Secret resolution.
//!
//! Secrets are looked up on every use rather than captured at startup, so a
//! missing provider key only fails the requests that need it.

use dealflow_core::ConfigError;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

/// Name of the text-generation provider key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";

/// Source of named secrets.
pub trait SecretStore: Send + Sync {
    /// The secret named `name`, if configured.
    fn get(&self, name: &str) -> Option<SecretString>;

    /// The secret named `name`, or [`ConfigError::SecretMissing`] when it is
    /// absent or blank.
    fn require(&self, name: &str) -> Result<SecretString, ConfigError> {
        self.get(name)
            .filter(|secret| !secret.expose_secret().trim().is_empty())
            .ok_or_else(|| ConfigError::SecretMissing {
                name: name.to_string(),
            })
    }
}

/// Reads secrets from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, name: &str) -> Option<SecretString> {
        std::env::var(name)
            .ok()
            .map(|value| SecretString::new(value.into()))
    }
}

/// Fixed set of secrets, for tests and embedded use.
#[derive(Clone, Default)]
pub struct StaticSecretStore {
    secrets: HashMap<String, SecretString>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.secrets
            .insert(name.into(), SecretString::new(value.into().into()));
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn get(&self, name: &str) -> Option<SecretString> {
        self.secrets.get(name).cloned()
    }
}

impl std::fmt::Debug for StaticSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticSecretStore")
            .field("names", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}
