//! Core types for Blogcast

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BlogcastError, Result};

/// Heading marker that introduces the document title
const TITLE_MARKER: &str = "# ";

/// A markdown article ready to be syndicated
///
/// Built explicitly from source text; every platform adapter receives the
/// same read-only value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    title: String,
    body: String,
    body_without_title: String,
}

impl Document {
    /// Parse a document from raw markdown
    ///
    /// The title is the first line that begins with `# `, with the marker and
    /// surrounding whitespace stripped. That line (and its line terminator) is
    /// removed to form [`Document::body_without_title`]; every other line is
    /// preserved unchanged.
    ///
    /// # Errors
    ///
    /// Returns `BlogcastError::InvalidInput` when no line starts with `# ` or
    /// the heading text is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use libblogcast::Document;
    ///
    /// let doc = Document::parse("# Hello World\n\nThis is a test post.").unwrap();
    /// assert_eq!(doc.title(), "Hello World");
    /// assert_eq!(doc.body_without_title(), "\nThis is a test post.");
    /// ```
    pub fn parse(source: &str) -> Result<Self> {
        let mut offset = 0;

        for line in source.split_inclusive('\n') {
            if let Some(heading) = line.strip_prefix(TITLE_MARKER) {
                let title = heading.trim();
                if title.is_empty() {
                    return Err(BlogcastError::InvalidInput(
                        "Title heading is empty. Suggestion: write the title after the '# ' marker."
                            .to_string(),
                    ));
                }

                let mut body_without_title = String::with_capacity(source.len() - line.len());
                body_without_title.push_str(&source[..offset]);
                body_without_title.push_str(&source[offset + line.len()..]);

                return Ok(Self {
                    title: title.to_string(),
                    body: source.to_string(),
                    body_without_title,
                });
            }
            offset += line.len();
        }

        Err(BlogcastError::InvalidInput(
            "Document has no title. Suggestion: start a line with '# ' followed by the title."
                .to_string(),
        ))
    }

    /// Read and parse a markdown file
    pub fn from_file(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path).map_err(|source| BlogcastError::InputRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&source)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Full source text, title line included
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Text with the title line removed, for platforms that render the title separately
    pub fn body_without_title(&self) -> &str {
        &self.body_without_title
    }
}

/// The platforms Blogcast can publish to
///
/// The declaration order is the publishing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Devto,
    Medium,
    Hashnode,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 3] = [
        PlatformKind::Devto,
        PlatformKind::Medium,
        PlatformKind::Hashnode,
    ];

    /// Lowercase identifier used in config files and CLI flags
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Devto => "devto",
            PlatformKind::Medium => "medium",
            PlatformKind::Hashnode => "hashnode",
        }
    }

    /// Human-readable name used in progress notices
    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformKind::Devto => "Dev.to",
            PlatformKind::Medium => "Medium",
            PlatformKind::Hashnode => "Hashnode",
        }
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PlatformKind {
    type Err = BlogcastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "devto" | "dev.to" => Ok(PlatformKind::Devto),
            "medium" => Ok(PlatformKind::Medium),
            "hashnode" => Ok(PlatformKind::Hashnode),
            other => Err(BlogcastError::InvalidInput(format!(
                "Unknown platform '{}'. Valid platforms: devto, medium, hashnode",
                other
            ))),
        }
    }
}

/// Identifiers returned by a platform after a successful publish
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReceipt {
    /// Platform-specific post id
    pub post_id: Option<String>,
    /// URL slug, where the platform returns one
    pub slug: Option<String>,
    /// Public URL of the new post
    pub url: Option<String>,
}

/// Outcome of publishing to a single platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishResult {
    pub platform: PlatformKind,
    pub success: bool,
    #[serde(flatten)]
    pub receipt: PublishReceipt,
    /// Upstream error payload or message (if failed)
    pub error: Option<String>,
    pub published_at: Option<i64>,
}

impl PublishResult {
    pub fn succeeded(platform: PlatformKind, receipt: PublishReceipt) -> Self {
        Self {
            platform,
            success: true,
            receipt,
            error: None,
            published_at: Some(chrono::Utc::now().timestamp()),
        }
    }

    pub fn failed(platform: PlatformKind, error: &BlogcastError) -> Self {
        Self {
            platform,
            success: false,
            receipt: PublishReceipt::default(),
            error: Some(error.to_string()),
            published_at: None,
        }
    }
}
