//! WebDriver-backed browser sessions (fantoccini)
//!
//! Needs a running WebDriver server such as chromedriver at
//! `medium.browser.webdriver_url`.

use std::time::Duration;

use async_trait::async_trait;
use fantoccini::cookies::Cookie;
use fantoccini::elements::Element;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder, Locator};
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::medium::browser::{BrowserLauncher, BrowserSession, Target};
use crate::platforms::medium::cookies::SessionCookie;

fn ui_error(action: &str, error: impl std::fmt::Display) -> PlatformError {
    PlatformError::UiAutomation(format!("{}: {}", action, error))
}

/// Launches Chrome sessions through a WebDriver server
pub struct WebDriverLauncher {
    webdriver_url: String,
    headless: bool,
    wait_timeout: Duration,
}

impl WebDriverLauncher {
    /// `wait_timeout` bounds page loads and scripts in the launched sessions
    pub fn new(webdriver_url: impl Into<String>, headless: bool, wait_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            wait_timeout,
        }
    }

    /// Session timeouts; element lookups poll explicitly so no implicit wait
    fn timeouts(&self) -> TimeoutConfiguration {
        TimeoutConfiguration::new(
            Some(self.wait_timeout),
            Some(self.wait_timeout),
            Some(Duration::ZERO),
        )
    }

    fn capabilities(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut args = vec!["--disable-gpu", "--no-sandbox", "--window-size=1280,1024"];
        if self.headless {
            args.push("--headless=new");
        }

        let mut caps = serde_json::Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );
        caps
    }
}

#[async_trait]
impl BrowserLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        let mut builder =
            ClientBuilder::rustls().map_err(|e| ui_error("Failed to set up WebDriver TLS", e))?;
        builder.capabilities(self.capabilities());

        let client = builder.connect(&self.webdriver_url).await.map_err(|e| {
            ui_error(
                &format!("Failed to start a browser session at {}", self.webdriver_url),
                e,
            )
        })?;

        if let Err(e) = client.update_timeouts(self.timeouts()).await {
            let _ = client.close().await;
            return Err(ui_error("Failed to set browser session timeouts", e).into());
        }

        tracing::debug!("Browser session started via {}", self.webdriver_url);
        Ok(Box::new(WebDriverSession { client }))
    }
}

pub struct WebDriverSession {
    client: Client,
}

impl WebDriverSession {
    async fn find(&self, target: &Target, timeout: Duration) -> Result<Element> {
        let xpath;
        let locator = match target {
            Target::Css(selector) => Locator::Css(selector),
            Target::ButtonLabel(label) => {
                xpath = format!("//button[normalize-space(.)='{}']", label);
                Locator::XPath(&xpath)
            }
        };

        self.client
            .wait()
            .at_most(timeout)
            .for_element(locator)
            .await
            .map_err(|e| {
                ui_error(
                    &format!("{} did not appear within {}s", target, timeout.as_secs()),
                    e,
                )
                .into()
            })
    }
}

#[async_trait]
impl BrowserSession for WebDriverSession {
    async fn goto(&mut self, url: &str) -> Result<()> {
        self.client
            .goto(url)
            .await
            .map_err(|e| ui_error(&format!("Failed to open {}", url), e).into())
    }

    async fn add_cookie(&mut self, cookie: &SessionCookie) -> Result<()> {
        let mut web_cookie = Cookie::new(cookie.name.clone(), cookie.value.clone());
        web_cookie.set_domain(cookie.domain.clone());
        web_cookie.set_path(cookie.path.clone());
        web_cookie.set_secure(cookie.secure);
        web_cookie.set_http_only(cookie.http_only);

        self.client
            .add_cookie(web_cookie)
            .await
            .map_err(|e| ui_error(&format!("Failed to set cookie {}", cookie.name), e).into())
    }

    async fn type_text(
        &mut self,
        target: &Target,
        text: &str,
        keystroke_delay: Duration,
        timeout: Duration,
    ) -> Result<()> {
        let element = self.find(target, timeout).await?;
        element
            .click()
            .await
            .map_err(|e| ui_error(&format!("Failed to focus {}", target), e))?;

        let mut buffer = [0u8; 4];
        for ch in text.chars() {
            element
                .send_keys(ch.encode_utf8(&mut buffer))
                .await
                .map_err(|e| ui_error(&format!("Failed to type into {}", target), e))?;
            if !keystroke_delay.is_zero() {
                sleep(keystroke_delay).await;
            }
        }
        Ok(())
    }

    async fn click(&mut self, target: &Target, timeout: Duration) -> Result<()> {
        let element = self.find(target, timeout).await?;
        element
            .click()
            .await
            .map_err(|e| ui_error(&format!("Failed to click {}", target), e).into())
    }

    async fn current_url(&mut self) -> Result<String> {
        self.client
            .current_url()
            .await
            .map(|url| url.to_string())
            .map_err(|e| ui_error("Failed to read the current URL", e).into())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client
            .close()
            .await
            .map_err(|e| ui_error("Failed to close the browser session", e).into())
    }
}
