//! Configuration management for Blogcast
//!
//! Every section is optional. A missing config file yields the built-in
//! defaults, which publish to all three platforms using credentials from
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::types::PlatformKind;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputConfig,
    pub credentials: CredentialsConfig,
    pub defaults: DefaultsConfig,
    pub http: HttpConfig,
    pub devto: DevtoConfig,
    pub medium: MediumConfig,
    pub hashnode: HashnodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Markdown file to publish
    pub path: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: "blog.md".to_string(),
        }
    }
}

/// Where platform secrets are read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    /// `DEVTO_API_KEY`, `MEDIUM_INTEGRATION_TOKEN`, `HASHNODE_API_KEY`
    #[default]
    Env,
    /// CI action inputs `devto_api_key`, `medium_token`, `hashnode_api_key`
    Action,
}

impl std::str::FromStr for CredentialSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "env" => Ok(CredentialSource::Env),
            "action" => Ok(CredentialSource::Action),
            _ => Err(ConfigError::InvalidValue {
                field: "credentials.source".to_string(),
                message: format!("'{}' (valid options: env, action)", s),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    pub source: CredentialSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub platforms: Vec<PlatformKind>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            platforms: PlatformKind::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevtoConfig {
    pub enabled: bool,
    pub base_url: String,
}

impl Default for DevtoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://dev.to".to_string(),
        }
    }
}

/// How Medium posts are created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediumStrategy {
    /// Official REST API with an integration token
    #[default]
    Api,
    /// Scripted composer UI in a browser session restored from cookies
    Browser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediumConfig {
    pub enabled: bool,
    pub strategy: MediumStrategy,
    pub base_url: String,
    pub browser: MediumBrowserConfig,
}

impl Default for MediumConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            strategy: MediumStrategy::Api,
            base_url: "https://api.medium.com".to_string(),
            browser: MediumBrowserConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediumBrowserConfig {
    /// Session cookies for the Medium domain (Netscape cookies.txt or JSON array)
    pub cookies_file: String,
    /// Domain the stored cookies must belong to
    pub cookie_domain: String,
    /// WebDriver endpoint (chromedriver, geckodriver)
    pub webdriver_url: String,
    /// Page the session visits before cookies are installed
    pub home_url: String,
    pub composer_url: String,
    /// Composer field that receives the title
    pub title_selector: String,
    /// Composer field that receives the body
    pub body_selector: String,
    pub headless: bool,
    /// Upper bound on every element and navigation wait
    pub wait_timeout_secs: u64,
    /// Pause between the "Publish" and "Publish now" clicks
    pub settle_millis: u64,
    pub keystroke_delay_millis: u64,
}

impl Default for MediumBrowserConfig {
    fn default() -> Self {
        Self {
            cookies_file: "./cookies.txt".to_string(),
            cookie_domain: "medium.com".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            home_url: "https://medium.com/".to_string(),
            composer_url: "https://medium.com/new-story".to_string(),
            title_selector: r#"h3[data-testid="editorTitleParagraph"]"#.to_string(),
            body_selector: r#"p[data-testid="editorParagraphText"]"#.to_string(),
            headless: true,
            wait_timeout_secs: 30,
            settle_millis: 2000,
            keystroke_delay_millis: 5,
        }
    }
}

impl MediumBrowserConfig {
    /// Expand `~` and environment variables in the cookie file path
    pub fn expand_cookies_file_path(&self) -> Result<PathBuf> {
        let expanded = shellexpand::full(&self.cookies_file).map_err(|e| {
            ConfigError::InvalidValue {
                field: "medium.browser.cookies_file".to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(PathBuf::from(expanded.as_ref()))
    }

    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn keystroke_delay(&self) -> Duration {
        Duration::from_millis(self.keystroke_delay_millis)
    }
}

/// Which Hashnode GraphQL schema to talk to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashnodeApi {
    /// `me.publication._id` discovery and `createStory`
    Legacy,
    /// `me.publications(first: 10)` discovery and `createPublicationStory`
    #[default]
    Publications,
}

/// Format of the Hashnode `Authorization` header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: <token>`
    #[default]
    Bare,
    /// `Authorization: Bearer <token>`
    Bearer,
}

impl AuthScheme {
    pub fn header_value(&self, token: &str) -> String {
        match self {
            AuthScheme::Bare => token.to_string(),
            AuthScheme::Bearer => format!("Bearer {}", token),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HashnodeConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api: HashnodeApi,
    pub auth_scheme: AuthScheme,
}

impl Default for HashnodeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://gql.hashnode.com".to_string(),
            api: HashnodeApi::default(),
            auth_scheme: AuthScheme::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    ///
    /// Falls back to [`Config::default`] when no config file exists.
    pub fn load() -> Result<Self> {
        let config_path = resolve_config_path()?;
        if !config_path.exists() {
            tracing::debug!(
                "No config file at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make a publish run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.input.path.trim().is_empty() {
            return Err(ConfigError::MissingField("input.path".to_string()).into());
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        if self.medium.strategy == MediumStrategy::Browser
            && self.medium.browser.wait_timeout_secs == 0
        {
            return Err(ConfigError::InvalidValue {
                field: "medium.browser.wait_timeout_secs".to_string(),
                message: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Platforms to publish to, in publishing order
    ///
    /// A platform must be listed in `defaults.platforms` and enabled in its
    /// own section. `only` narrows the result further (e.g. `--platform`).
    pub fn enabled_platforms(&self, only: Option<&[PlatformKind]>) -> Vec<PlatformKind> {
        let mut platforms: Vec<PlatformKind> = self
            .defaults
            .platforms
            .iter()
            .copied()
            .filter(|kind| self.is_enabled(*kind))
            .filter(|kind| only.map_or(true, |selected| selected.contains(kind)))
            .collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }

    fn is_enabled(&self, kind: PlatformKind) -> bool {
        match kind {
            PlatformKind::Devto => self.devto.enabled,
            PlatformKind::Medium => self.medium.enabled,
            PlatformKind::Hashnode => self.hashnode.enabled,
        }
    }
}

/// Resolve the configuration file path (`BLOGCAST_CONFIG`, then the XDG config dir)
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("BLOGCAST_CONFIG") {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("blogcast").join("config.toml"))
}
