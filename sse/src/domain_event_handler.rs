use crate::message::{Event as SseEvent, Message as SseMessage, MessageScope};
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use serde_json::json;
use std::sync::Arc;

/// Handles domain events by converting them to SSE events and sending them to
/// the affected user.
///
/// The producing operation names the owner of the affected record in the event;
/// this handler only converts and routes. Users are not notified about their
/// own actions (liking their own post, downloading their own paper).
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }

    /// Build the notification a client receives for `event`.
    pub fn to_sse_event(event: &DomainEvent) -> SseEvent {
        match event {
            DomainEvent::PaperDownloaded {
                paper_id,
                paper_title,
                downloaded_by,
                ..
            } => SseEvent::new("paper_downloaded").with_payload(json!({
                "paperId": paper_id,
                "paperTitle": paper_title,
                "downloadedBy": downloaded_by,
            })),
            DomainEvent::PostLiked {
                post_id, liked_by, ..
            } => SseEvent::new("like").with_payload(json!({
                "postId": post_id,
                "likedBy": liked_by,
            })),
            DomainEvent::CommentAdded {
                post_id,
                comment,
                commented_by,
                ..
            } => SseEvent::new("comment").with_payload(json!({
                "postId": post_id,
                "comment": comment,
                "commentedBy": commented_by,
            })),
            DomainEvent::AnnouncementPublished { announcement } => {
                SseEvent::new("announcement").with_payload(announcement.clone())
            }
        }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let scope = match event.recipient_id() {
            Some(recipient) if event.actor_id() == Some(recipient) => {
                debug!("Skipping self-notification for user {recipient}");
                return;
            }
            Some(recipient) => MessageScope::User {
                user_id: recipient.clone(),
            },
            None => MessageScope::Broadcast,
        };

        let sse_event = Self::to_sse_event(event);
        debug!("Handling domain event as SSE {:?}", sse_event.event_type);

        self.sse_manager.send_message(SseMessage {
            event: sse_event,
            scope,
        });
    }
}
