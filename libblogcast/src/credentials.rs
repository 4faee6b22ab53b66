//! Credential sourcing for Blogcast
//!
//! Platform secrets are resolved exactly once, at startup, through a
//! [`CredentialProvider`]. Each provider knows one source:
//!
//! - [`EnvCredentialProvider`]: process environment variables
//! - [`ActionInputProvider`]: CI action inputs (`INPUT_*` variables set by the runner)
//! - [`StaticCredentialProvider`]: in-memory values, for tests and embedding
//!
//! Adapters never see the provider. They receive a `SecretString` taken
//! from the resolved [`Credentials`].
//!
//! # Example
//!
//! ```no_run
//! use libblogcast::credentials::{Credentials, EnvCredentialProvider};
//! use libblogcast::PlatformKind;
//!
//! let provider = EnvCredentialProvider;
//! let mut credentials = Credentials::resolve(&provider, &PlatformKind::ALL);
//! let devto_key = credentials.take(PlatformKind::Devto);
//! ```

use std::collections::HashMap;

use secrecy::SecretString;
use tracing::{debug, warn};

use crate::config::CredentialSource;
use crate::types::PlatformKind;

/// A source of per-platform secrets
pub trait CredentialProvider: Send + Sync {
    /// Look up the secret for a platform
    ///
    /// Returns `None` when the source has no (or an empty) value.
    fn credential(&self, platform: PlatformKind) -> Option<SecretString>;

    /// Name of this source, for logging
    fn source_name(&self) -> &str;
}

/// Build the provider selected in configuration
pub fn provider_for(source: CredentialSource) -> Box<dyn CredentialProvider> {
    match source {
        CredentialSource::Env => Box::new(EnvCredentialProvider),
        CredentialSource::Action => Box::new(ActionInputProvider),
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Reads `DEVTO_API_KEY`, `MEDIUM_INTEGRATION_TOKEN` and `HASHNODE_API_KEY`
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub fn variable_name(platform: PlatformKind) -> &'static str {
        match platform {
            PlatformKind::Devto => "DEVTO_API_KEY",
            PlatformKind::Medium => "MEDIUM_INTEGRATION_TOKEN",
            PlatformKind::Hashnode => "HASHNODE_API_KEY",
        }
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credential(&self, platform: PlatformKind) -> Option<SecretString> {
        std::env::var(Self::variable_name(platform))
            .ok()
            .and_then(non_empty)
            .map(SecretString::from)
    }

    fn source_name(&self) -> &str {
        "env"
    }
}

/// Reads CI action inputs
///
/// The runner exposes an input named `devto_api_key` as the environment
/// variable `INPUT_DEVTO_API_KEY`: uppercased, spaces replaced by `_`,
/// value trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionInputProvider;

impl ActionInputProvider {
    pub fn input_name(platform: PlatformKind) -> &'static str {
        match platform {
            PlatformKind::Devto => "devto_api_key",
            PlatformKind::Medium => "medium_token",
            PlatformKind::Hashnode => "hashnode_api_key",
        }
    }

    /// Environment variable that carries the named input
    pub fn variable_for(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }

    /// Read any action input, e.g. `markdown_file`
    pub fn input(name: &str) -> Option<String> {
        std::env::var(Self::variable_for(name))
            .ok()
            .and_then(non_empty)
    }
}

impl CredentialProvider for ActionInputProvider {
    fn credential(&self, platform: PlatformKind) -> Option<SecretString> {
        Self::input(Self::input_name(platform)).map(SecretString::from)
    }

    fn source_name(&self) -> &str {
        "action"
    }
}

/// Fixed in-memory secrets
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialProvider {
    values: HashMap<PlatformKind, String>,
}

impl StaticCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, platform: PlatformKind, value: impl Into<String>) -> Self {
        self.values.insert(platform, value.into());
        self
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credential(&self, platform: PlatformKind) -> Option<SecretString> {
        self.values
            .get(&platform)
            .cloned()
            .and_then(non_empty)
            .map(SecretString::from)
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// Secrets resolved for one run
#[derive(Debug)]
pub struct Credentials {
    secrets: HashMap<PlatformKind, SecretString>,
}

impl Credentials {
    /// Resolve secrets for the given platforms
    ///
    /// A missing secret is not an error here: the adapter sends an empty
    /// credential and the platform rejects it with an authentication error.
    pub fn resolve(provider: &dyn CredentialProvider, platforms: &[PlatformKind]) -> Self {
        let mut secrets = HashMap::new();

        for &platform in platforms {
            match provider.credential(platform) {
                Some(secret) => {
                    debug!(
                        "{} credential present (source: {})",
                        platform,
                        provider.source_name()
                    );
                    secrets.insert(platform, secret);
                }
                None => {
                    warn!(
                        "{} credential missing (source: {}); the platform will reject the request",
                        platform,
                        provider.source_name()
                    );
                }
            }
        }

        Self { secrets }
    }

    pub fn contains(&self, platform: PlatformKind) -> bool {
        self.secrets.contains_key(&platform)
    }

    /// Hand a platform's secret to its adapter, or an empty secret when missing
    pub fn take(&mut self, platform: PlatformKind) -> SecretString {
        self.secrets
            .remove(&platform)
            .unwrap_or_else(|| SecretString::from(String::new()))
    }
}
