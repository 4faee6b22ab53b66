//! Multi-platform publishing orchestration
//!
//! Platforms are published to one at a time, Dev.to then Medium then
//! Hashnode. The first failure aborts the run: later platforms are never
//! attempted and earlier posts are left in place.

use tracing::{info, warn};

use crate::config::{Config, MediumStrategy};
use crate::credentials::Credentials;
use crate::error::{BlogcastError, Result};
use crate::events::{Event, EventBus};
use crate::platforms::devto::DevtoClient;
use crate::platforms::hashnode::HashnodeClient;
use crate::platforms::medium::browser::MediumBrowserPublisher;
use crate::platforms::medium::MediumClient;
use crate::platforms::Platform;
use crate::types::{Document, PlatformKind, PublishResult};

/// Fail-fast sequential publisher
pub struct SequentialPublisher {
    /// Platform adapters, kept in publishing order
    platforms: Vec<Box<dyn Platform>>,
    events: Option<EventBus>,
}

impl SequentialPublisher {
    /// Create a publisher
    ///
    /// Adapters are reordered by [`PlatformKind`] so the sequence is always
    /// Dev.to, Medium, Hashnode regardless of registration order.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libblogcast::config::Config;
    /// use libblogcast::credentials::{Credentials, EnvCredentialProvider};
    /// use libblogcast::poster::{create_platforms, SequentialPublisher};
    /// use libblogcast::Document;
    /// use std::path::Path;
    ///
    /// # async fn example() -> libblogcast::error::Result<()> {
    /// let config = Config::load()?;
    /// let enabled = config.enabled_platforms(None);
    /// let mut credentials = Credentials::resolve(&EnvCredentialProvider, &enabled);
    /// let platforms = create_platforms(&config, &mut credentials, &enabled)?;
    ///
    /// let document = Document::from_file(Path::new(&config.input.path))?;
    /// let results = SequentialPublisher::new(platforms).publish_all(&document).await?;
    /// for result in results {
    ///     println!("{}: {:?}", result.platform, result.receipt.url);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(mut platforms: Vec<Box<dyn Platform>>) -> Self {
        platforms.sort_by_key(|platform| platform.kind());
        Self {
            platforms,
            events: None,
        }
    }

    /// Emit progress events on `bus`
    pub fn with_events(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    /// Platforms in the order they will be attempted
    pub fn platforms(&self) -> Vec<PlatformKind> {
        self.platforms.iter().map(|p| p.kind()).collect()
    }

    fn emit(&self, event: Event) {
        if let Some(bus) = &self.events {
            bus.emit(event);
        }
    }

    /// Publish the document to every platform in order
    ///
    /// # Returns
    ///
    /// One successful [`PublishResult`] per platform, in publishing order.
    ///
    /// # Errors
    ///
    /// The first adapter failure, wrapped in `BlogcastError::Publish` naming
    /// the platform. No later adapter is invoked.
    pub async fn publish_all(&self, document: &Document) -> Result<Vec<PublishResult>> {
        self.emit(Event::PublishStarted {
            title: document.title().to_string(),
            platforms: self.platforms(),
        });

        let mut results = Vec::with_capacity(self.platforms.len());

        for platform in &self.platforms {
            let kind = platform.kind();
            info!("Publishing to {}", platform.name());
            self.emit(Event::PlatformStarted { platform: kind });

            match platform.publish(document).await {
                Ok(receipt) => {
                    info!("{} published: {:?}", platform.name(), receipt);
                    let result = PublishResult::succeeded(kind, receipt);
                    self.emit(Event::PlatformSucceeded {
                        result: result.clone(),
                    });
                    results.push(result);
                }
                Err(e) => {
                    warn!("{} failed, aborting remaining platforms: {}", platform.name(), e);
                    self.emit(Event::PlatformFailed {
                        result: PublishResult::failed(kind, &e),
                    });
                    return Err(BlogcastError::Publish {
                        platform: platform.name().to_string(),
                        source: Box::new(e),
                    });
                }
            }
        }

        self.emit(Event::PublishCompleted {
            results: results.clone(),
        });
        Ok(results)
    }
}

/// Create platform adapters from configuration
///
/// Each adapter takes its secret out of `credentials`. `enabled` is usually
/// [`Config::enabled_platforms`].
///
/// # Errors
///
/// Returns an error if an HTTP client cannot be built or the Medium browser
/// strategy is selected in a build without browser support.
pub fn create_platforms(
    config: &Config,
    credentials: &mut Credentials,
    enabled: &[PlatformKind],
) -> Result<Vec<Box<dyn Platform>>> {
    let mut platforms: Vec<Box<dyn Platform>> = Vec::new();
    let timeout = config.http.timeout();

    for &kind in enabled {
        match kind {
            PlatformKind::Devto => {
                info!("Creating Dev.to platform client");
                platforms.push(Box::new(DevtoClient::new(
                    &config.devto.base_url,
                    credentials.take(kind),
                    timeout,
                )?));
            }
            PlatformKind::Medium => match config.medium.strategy {
                MediumStrategy::Api => {
                    info!("Creating Medium API client");
                    platforms.push(Box::new(MediumClient::new(
                        &config.medium.base_url,
                        credentials.take(kind),
                        timeout,
                    )?));
                }
                MediumStrategy::Browser => {
                    info!("Creating Medium browser publisher");
                    platforms.push(Box::new(medium_browser_publisher(config)?));
                }
            },
            PlatformKind::Hashnode => {
                info!("Creating Hashnode platform client");
                platforms.push(Box::new(HashnodeClient::new(
                    &config.hashnode,
                    credentials.take(kind),
                    timeout,
                )?));
            }
        }
    }

    if platforms.is_empty() {
        warn!("No platforms are enabled in configuration");
    } else {
        info!("Created {} platform client(s)", platforms.len());
    }

    Ok(platforms)
}

#[cfg(feature = "browser")]
fn medium_browser_publisher(config: &Config) -> Result<MediumBrowserPublisher> {
    use crate::platforms::medium::webdriver::WebDriverLauncher;

    let browser = &config.medium.browser;
    let launcher = WebDriverLauncher::new(
        browser.webdriver_url.clone(),
        browser.headless,
        browser.wait_timeout(),
    );
    MediumBrowserPublisher::new(browser.clone(), Box::new(launcher))
}

#[cfg(not(feature = "browser"))]
fn medium_browser_publisher(_config: &Config) -> Result<MediumBrowserPublisher> {
    use crate::error::ConfigError;

    Err(ConfigError::InvalidValue {
        field: "medium.strategy".to_string(),
        message: "'browser' requires blogcast to be built with the 'browser' feature".to_string(),
    }
    .into())
}

/// Platforms whose adapters need a secret from the credential provider
///
/// The Medium browser strategy authenticates with stored cookies instead.
pub fn platforms_needing_credentials(config: &Config, enabled: &[PlatformKind]) -> Vec<PlatformKind> {
    enabled
        .iter()
        .copied()
        .filter(|kind| {
            !(*kind == PlatformKind::Medium && config.medium.strategy == MediumStrategy::Browser)
        })
        .collect()
}
