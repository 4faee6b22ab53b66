//! Platform abstraction and implementations
//!
//! Each blogging platform is reached through an adapter implementing
//! [`Platform`]. The adapter turns the generic "publish this document"
//! intent into that platform's request protocol.
//!
//! # Examples
//!
//! ```no_run
//! use libblogcast::platforms::{devto::DevtoClient, Platform};
//! use libblogcast::Document;
//! use secrecy::SecretString;
//! use std::time::Duration;
//!
//! # async fn example() -> libblogcast::error::Result<()> {
//! let document = Document::parse("# Hello\n\nFirst post.")?;
//! let devto = DevtoClient::new(
//!     "https://dev.to",
//!     SecretString::from("api-key".to_string()),
//!     Duration::from_secs(30),
//! )?;
//!
//! let receipt = devto.publish(&document).await?;
//! println!("Published to {}: {:?}", devto.name(), receipt.url);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Document, PlatformKind, PublishReceipt};

pub mod devto;
pub mod hashnode;
pub(crate) mod http;
pub mod medium;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Platform trait for publishing a document to one blogging service
#[async_trait]
pub trait Platform: Send + Sync {
    /// Which platform this adapter talks to
    ///
    /// Also determines the adapter's position in the publishing sequence.
    fn kind(&self) -> PlatformKind;

    /// Human-readable platform name (e.g., "Dev.to")
    fn name(&self) -> &str {
        self.kind().display_name()
    }

    /// Publish the document
    ///
    /// Runs to completion or failure; nothing is retried.
    ///
    /// # Errors
    ///
    /// - `PlatformError::Authentication` when the platform rejects the credential
    /// - `PlatformError::Network` for transport failures
    /// - `PlatformError::Posting` / `PlatformError::RateLimit` for other non-2xx responses,
    ///   carrying the upstream response body
    /// - `PlatformError::Discovery` / `PlatformError::UiAutomation` for
    ///   platform-specific protocol steps
    async fn publish(&self, document: &Document) -> Result<PublishReceipt>;
}
