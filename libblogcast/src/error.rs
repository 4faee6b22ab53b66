//! Error types for Blogcast

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BlogcastError>;

#[derive(Error, Debug)]
pub enum BlogcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read {}: {source}", path.display())]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A platform adapter failed; wraps the adapter's own error
    #[error("{platform} publishing failed: {source}")]
    Publish {
        platform: String,
        #[source]
        source: Box<BlogcastError>,
    },
}

impl BlogcastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            BlogcastError::InvalidInput(_) => 3,
            BlogcastError::InputRead { .. } => 3,
            BlogcastError::Platform(PlatformError::Authentication(_)) => 2,
            BlogcastError::Platform(_) => 1,
            BlogcastError::Config(_) => 1,
            BlogcastError::Publish { source, .. } => source.exit_code(),
        }
    }

    /// Name of the platform that failed, if this error came out of the orchestrator
    pub fn failed_platform(&self) -> Option<&str> {
        match self {
            BlogcastError::Publish { platform, .. } => Some(platform),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// A read performed to obtain an identifier for a later write came back empty
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// Browser automation did not observe an expected element or navigation in time
    #[error("UI automation failed: {0}")]
    UiAutomation(String),
}
