//! Mock platform implementation for testing
//!
//! This module provides a configurable mock platform that can simulate
//! successes, failures, and delays. It's designed for use in integration tests
//! to verify the publishing sequence without real credentials or network access.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{Document, PlatformKind, PublishReceipt};

/// Shared record of publish calls, in the order they happened
pub type CallLog = Arc<Mutex<Vec<PlatformKind>>>;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Which platform this mock stands in for
    pub kind: PlatformKind,

    /// Error to return from publish; `None` means success
    pub publish_error: Option<PlatformError>,

    /// Delay before completing (simulates network latency)
    pub delay: Duration,

    /// Number of times publish has been called
    pub publish_call_count: Arc<Mutex<usize>>,

    /// Titles that have been published (for verification)
    pub published_titles: Arc<Mutex<Vec<String>>>,

    /// Optional log shared between several mocks to check ordering
    pub call_log: Option<CallLog>,
}

impl MockConfig {
    pub fn new(kind: PlatformKind) -> Self {
        Self {
            kind,
            publish_error: None,
            delay: Duration::from_millis(0),
            publish_call_count: Arc::new(Mutex::new(0)),
            published_titles: Arc::new(Mutex::new(Vec::new())),
            call_log: None,
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
}

impl MockPlatform {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// Create a mock platform that always succeeds
    pub fn success(kind: PlatformKind) -> Self {
        Self::new(MockConfig::new(kind))
    }

    /// Create a mock platform that fails with the given error
    pub fn failure(kind: PlatformKind, error: PlatformError) -> Self {
        Self::new(MockConfig {
            publish_error: Some(error),
            ..MockConfig::new(kind)
        })
    }

    /// Create a mock platform with a delay
    pub fn with_delay(kind: PlatformKind, delay: Duration) -> Self {
        Self::new(MockConfig {
            delay,
            ..MockConfig::new(kind)
        })
    }

    /// Record every publish call into a shared log
    pub fn logging_to(mut self, log: &CallLog) -> Self {
        self.config.call_log = Some(log.clone());
        self
    }

    /// Handle to the call counter that outlives the boxed platform
    pub fn call_counter(&self) -> Arc<Mutex<usize>> {
        self.config.publish_call_count.clone()
    }

    /// Get the number of times publish was called
    pub fn publish_call_count(&self) -> usize {
        *self.config.publish_call_count.lock().unwrap()
    }

    /// Get all titles that were published
    pub fn published_titles(&self) -> Vec<String> {
        self.config.published_titles.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn kind(&self) -> PlatformKind {
        self.config.kind
    }

    async fn publish(&self, document: &Document) -> Result<PublishReceipt> {
        *self.config.publish_call_count.lock().unwrap() += 1;
        if let Some(log) = &self.config.call_log {
            log.lock().unwrap().push(self.config.kind);
        }

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if let Some(error) = &self.config.publish_error {
            return Err(error.clone().into());
        }

        self.config
            .published_titles
            .lock()
            .unwrap()
            .push(document.title().to_string());

        Ok(PublishReceipt {
            post_id: Some(format!("{}:mock-1", self.config.kind.as_str())),
            slug: None,
            url: Some(format!("https://{}.example/mock-1", self.config.kind.as_str())),
        })
    }
}
