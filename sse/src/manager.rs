use crate::connection::{
    ConnectionGuard, ConnectionRegistry, Delivery, FrameSender, Sink, UserId,
};
use crate::message::{Event, EventType, Frame, Message as SseMessage, MessageScope};
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Routes events to the streams held in the [`ConnectionRegistry`].
///
/// One `Manager` is built by the binary at startup and shared through the
/// application state; every request handler reaches the same registry through it.
pub struct Manager {
    registry: Arc<ConnectionRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Open a stream for `user_id` over `sender`.
    ///
    /// The `connected` handshake frame is queued before the sink is registered,
    /// so it is always the first frame the client reads. Keep the returned guard
    /// alive for as long as the stream is open.
    pub fn open_connection(&self, user_id: UserId, sender: FrameSender) -> ConnectionGuard {
        let sink = Sink::new(sender);

        if let Some(frame) = Self::encode(&Event::connected()) {
            if let Err(e) = sink.write(frame) {
                warn!("Failed to write SSE handshake for user {user_id}: {e}");
            }
        }

        let connection_id = sink.connection_id().clone();
        if let Some(previous) = self.registry.register(user_id.clone(), sink) {
            info!(
                "SSE connection {} for user {} superseded by {}",
                previous.connection_id().as_str(),
                user_id,
                connection_id.as_str()
            );
        }
        info!(
            "Registered new SSE connection {} for user {}",
            connection_id.as_str(),
            user_id
        );

        ConnectionGuard::new(self.registry.clone(), user_id, connection_id)
    }

    /// Store `sink` for `user_id`, replacing any previous stream.
    pub fn register_connection(&self, user_id: UserId, sink: Sink) {
        self.registry.register(user_id, sink);
    }

    /// Forget the stream of `user_id`, if any.
    pub fn unregister_connection(&self, user_id: &str) {
        info!("Unregistering SSE connection for user {user_id}");
        self.registry.unregister(user_id);
    }

    pub fn lookup(&self, user_id: &str) -> Option<Sink> {
        self.registry.lookup(user_id)
    }

    pub fn is_connected(&self, user_id: &str) -> bool {
        self.registry.contains(user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    /// Deliver `event` to `user_id` if that user currently has a stream open.
    ///
    /// Best effort and at most once: nothing is queued for offline users, nothing
    /// is retried, and no failure reaches the caller.
    pub fn publish(&self, user_id: &str, event: &Event) -> Delivery {
        let Some(frame) = Self::encode(event) else {
            return Delivery::Dropped;
        };

        let delivery = self.registry.send_to_user(user_id, frame);
        debug!(
            "SSE event {} for user {}: {:?}",
            event.event_type(),
            user_id,
            delivery
        );
        delivery
    }

    /// Deliver `event` to every open stream. Returns the number of streams written to.
    pub fn broadcast(&self, event: &Event) -> usize {
        match Self::encode(event) {
            Some(frame) => self.registry.broadcast(frame),
            None => 0,
        }
    }

    /// Send a message based on its scope
    pub fn send_message(&self, message: SseMessage) {
        match message.scope {
            MessageScope::User { user_id } => {
                self.publish(&user_id, &message.event);
            }
            MessageScope::Broadcast => {
                let delivered = self.broadcast(&message.event);
                debug!(
                    "Broadcast SSE event {} to {} connection(s)",
                    message.event.event_type(),
                    delivered
                );
            }
        }
    }

    /// Remove streams whose peer vanished without a clean close.
    pub fn prune_closed(&self) -> usize {
        self.registry.prune()
    }

    fn encode(event: &Event) -> Option<Frame> {
        match Frame::from_event(event) {
            Ok(frame) => Some(frame),
            Err(e) => {
                error!("Failed to serialize SSE event {}: {e}", event.event_type());
                None
            }
        }
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

/// Run [`Manager::prune_closed`] every `interval` until the runtime shuts down.
pub fn spawn_sweep(manager: Arc<Manager>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = manager.prune_closed();
            if removed > 0 {
                info!(
                    "SSE sweep removed {} connection(s), {} remaining",
                    removed,
                    manager.connection_count()
                );
            } else {
                trace!("SSE sweep found nothing to remove");
            }
        }
    })
}
