//! Blogcast - publish one markdown post to Dev.to, Medium and Hashnode
//!
//! A run reads a markdown file whose first `# ` heading is the title, then
//! publishes it to each enabled platform in a fixed order. The first
//! failure stops the run.

pub mod config;
pub mod credentials;
pub mod error;
pub mod events;
pub mod logging;
pub mod platforms;
pub mod poster;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use credentials::{CredentialProvider, Credentials};
pub use error::{BlogcastError, Result};
pub use poster::SequentialPublisher;
pub use types::{Document, PlatformKind, PublishReceipt, PublishResult};
