//! Event system infrastructure for the GDG AOU community platform.
//!
//! This crate provides the event system that decouples the business operations
//! of the platform (a like, a comment, a paper download) from infrastructure
//! concerns like real-time notifications.
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates, so producers and
//! consumers can both depend on it. Record data is carried as serialized JSON values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Opaque identifier of a user, post, paper or any other record.
/// Identifiers are issued by the document store and never interpreted here.
pub type Id = String;

/// Domain events that represent business-level changes in the system.
/// These events are emitted after the producing operation has persisted its work.
///
/// Each user-scoped event names the user who caused it and the user who owns
/// the affected record. The owner is the one notified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Emitted when a shared paper is downloaded by another student.
    PaperDownloaded {
        paper_id: Id,
        /// Title shown in the notification so the client needs no extra lookup.
        paper_title: String,
        downloaded_by: Id,
        owner_id: Id,
    },
    /// Emitted when a blog post receives a like.
    PostLiked {
        post_id: Id,
        liked_by: Id,
        author_id: Id,
    },
    /// Emitted when a comment is added to a blog post.
    CommentAdded {
        post_id: Id,
        /// Complete serialized comment record (id, body, author, timestamps).
        comment: Value,
        commented_by: Id,
        author_id: Id,
    },
    /// Emitted when an administrator publishes a community-wide announcement.
    /// Delivered to every connected user.
    AnnouncementPublished { announcement: Value },
}

impl DomainEvent {
    /// The user who caused the event, if the event has one.
    pub fn actor_id(&self) -> Option<&Id> {
        match self {
            DomainEvent::PaperDownloaded { downloaded_by, .. } => Some(downloaded_by),
            DomainEvent::PostLiked { liked_by, .. } => Some(liked_by),
            DomainEvent::CommentAdded { commented_by, .. } => Some(commented_by),
            DomainEvent::AnnouncementPublished { .. } => None,
        }
    }

    /// The user to notify, or `None` for events addressed to everyone.
    pub fn recipient_id(&self) -> Option<&Id> {
        match self {
            DomainEvent::PaperDownloaded { owner_id, .. } => Some(owner_id),
            DomainEvent::PostLiked { author_id, .. } => Some(author_id),
            DomainEvent::CommentAdded { author_id, .. } => Some(author_id),
            DomainEvent::AnnouncementPublished { .. } => None,
        }
    }
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    /// Handlers do not return errors; each one is responsible for its own failures.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
