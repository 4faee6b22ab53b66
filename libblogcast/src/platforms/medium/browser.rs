//! Medium publishing through the web composer
//!
//! Used when the official API is unavailable. The session is restored from
//! stored cookies, the title and body are typed into the composer, and the
//! two-step publish dialog is clicked through. Every wait is bounded by
//! `medium.browser.wait_timeout_secs`; running out is a
//! `PlatformError::UiAutomation` failure. There is no fallback to the API.
//!
//! The browser itself sits behind [`BrowserLauncher`] / [`BrowserSession`]
//! so tests can drive a fake one. A WebDriver implementation lives in
//! `webdriver` behind the `browser` feature.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::MediumBrowserConfig;
use crate::error::{PlatformError, Result};
use crate::platforms::medium::cookies::{load_cookies, SessionCookie};
use crate::platforms::Platform;
use crate::types::{Document, PlatformKind, PublishReceipt};

/// Label of the button that opens the publish dialog
pub const PUBLISH_LABEL: &str = "Publish";
/// Label of the confirmation button inside the publish dialog
pub const PUBLISH_NOW_LABEL: &str = "Publish now";

const NAVIGATION_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How a page element is located
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// CSS selector
    Css(String),
    /// Button whose visible text is exactly this label
    ButtonLabel(String),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Css(selector) => write!(f, "element '{}'", selector),
            Target::ButtonLabel(label) => write!(f, "button '{}'", label),
        }
    }
}

/// Starts browser sessions
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// One browser window
///
/// Element operations wait at most `timeout` for the target to appear and
/// fail with `PlatformError::UiAutomation` when it does not.
#[async_trait]
pub trait BrowserSession: Send {
    async fn goto(&mut self, url: &str) -> Result<()>;

    async fn add_cookie(&mut self, cookie: &SessionCookie) -> Result<()>;

    /// Type `text` into the target one character at a time
    async fn type_text(
        &mut self,
        target: &Target,
        text: &str,
        keystroke_delay: Duration,
        timeout: Duration,
    ) -> Result<()>;

    async fn click(&mut self, target: &Target, timeout: Duration) -> Result<()>;

    async fn current_url(&mut self) -> Result<String>;

    /// Release the browser; called on success and failure alike
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Publishes to Medium by scripting the composer UI
pub struct MediumBrowserPublisher {
    config: MediumBrowserConfig,
    cookies_file: PathBuf,
    launcher: Box<dyn BrowserLauncher>,
}

impl MediumBrowserPublisher {
    pub fn new(config: MediumBrowserConfig, launcher: Box<dyn BrowserLauncher>) -> Result<Self> {
        let cookies_file = config.expand_cookies_file_path()?;
        Ok(Self {
            config,
            cookies_file,
            launcher,
        })
    }

    /// Everything between launch and close
    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        document: &Document,
        cookies: &[SessionCookie],
    ) -> Result<PublishReceipt> {
        let timeout = self.config.wait_timeout();
        let keystroke_delay = self.config.keystroke_delay();

        // Cookies can only be set for the domain currently loaded
        session.goto(&self.config.home_url).await?;
        for cookie in cookies {
            session.add_cookie(cookie).await?;
        }

        session.goto(&self.config.composer_url).await?;
        debug!("Opened Medium composer at {}", self.config.composer_url);

        session
            .type_text(
                &Target::Css(self.config.title_selector.clone()),
                document.title(),
                keystroke_delay,
                timeout,
            )
            .await?;
        session
            .type_text(
                &Target::Css(self.config.body_selector.clone()),
                document.body_without_title(),
                keystroke_delay,
                timeout,
            )
            .await?;

        session
            .click(&Target::ButtonLabel(PUBLISH_LABEL.to_string()), timeout)
            .await?;
        sleep(self.config.settle_delay()).await;

        let composer_url = session.current_url().await?;
        session
            .click(&Target::ButtonLabel(PUBLISH_NOW_LABEL.to_string()), timeout)
            .await?;

        let story_url = wait_for_navigation(session, &composer_url, timeout).await?;
        info!("Medium story published at {}", story_url);

        Ok(PublishReceipt {
            post_id: None,
            slug: None,
            url: Some(story_url),
        })
    }
}

/// Poll until the page URL moves away from `from`
async fn wait_for_navigation(
    session: &mut dyn BrowserSession,
    from: &str,
    timeout: Duration,
) -> Result<String> {
    let deadline = Instant::now() + timeout;
    loop {
        let current = session.current_url().await?;
        if current != from {
            return Ok(current);
        }
        if Instant::now() >= deadline {
            return Err(PlatformError::UiAutomation(format!(
                "No navigation away from {} within {}s after publishing",
                from,
                timeout.as_secs()
            ))
            .into());
        }
        sleep(NAVIGATION_POLL_INTERVAL).await;
    }
}

#[async_trait]
impl Platform for MediumBrowserPublisher {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Medium
    }

    async fn publish(&self, document: &Document) -> Result<PublishReceipt> {
        let cookies = load_cookies(&self.cookies_file, &self.config.cookie_domain)?;

        let mut session = self.launcher.launch().await?;
        let outcome = self.drive(session.as_mut(), document, &cookies).await;
        let closed = session.close().await;

        match (outcome, closed) {
            (Ok(receipt), Ok(())) => Ok(receipt),
            (Ok(receipt), Err(e)) => {
                warn!("Medium story published but closing the browser failed: {}", e);
                Ok(receipt)
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_error)) => {
                warn!("Closing the browser after a failure also failed: {}", close_error);
                Err(e)
            }
        }
    }
}
