//! Event system for progress tracking
//!
//! The orchestrator emits an event before and after every platform step.
//! Subscribers (the CLI progress printer, tests) receive them through a
//! `tokio::sync::broadcast` channel; with no subscribers, events are dropped.
//!
//! # Example
//!
//! ```no_run
//! use libblogcast::events::{Event, EventBus};
//! use libblogcast::PlatformKind;
//!
//! # async fn example() {
//! let event_bus = EventBus::new(64);
//! let mut receiver = event_bus.subscribe();
//!
//! event_bus.emit(Event::PlatformStarted {
//!     platform: PlatformKind::Devto,
//! });
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("{}", event);
//! }
//! # }
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{PlatformKind, PublishResult};

/// Event receiver type alias
pub type EventReceiver = broadcast::Receiver<Event>;

/// Event bus for distributing progress events
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    /// Create a new event bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> EventReceiver {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers without blocking
    pub fn emit(&self, event: Event) {
        // send() only fails when nobody is listening
        let _ = self.sender.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Progress of a publish run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The run is starting
    PublishStarted {
        title: String,
        platforms: Vec<PlatformKind>,
    },

    /// A platform step is starting
    PlatformStarted { platform: PlatformKind },

    /// A platform step succeeded
    PlatformSucceeded { result: PublishResult },

    /// A platform step failed; the run stops here
    PlatformFailed { result: PublishResult },

    /// Every platform succeeded
    PublishCompleted { results: Vec<PublishResult> },
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::PublishStarted { title, platforms } => {
                let names: Vec<&str> = platforms.iter().map(|p| p.display_name()).collect();
                write!(f, "Publishing \"{}\" to {}", title, names.join(", "))
            }
            Event::PlatformStarted { platform } => write!(f, "Publishing to {}...", platform),
            Event::PlatformSucceeded { result } => match &result.receipt.url {
                Some(url) => write!(f, "{} published: {}", result.platform, url),
                None => write!(f, "{} published", result.platform),
            },
            Event::PlatformFailed { result } => write!(
                f,
                "{} failed: {}",
                result.platform,
                result.error.as_deref().unwrap_or("unknown error")
            ),
            Event::PublishCompleted { results } => {
                write!(f, "Published to {} platform(s)", results.len())
            }
        }
    }
}
