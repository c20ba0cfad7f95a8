use crate::message::Frame;
use dashmap::DashMap;
use log::*;
use std::sync::Arc;
use tokio::sync::mpsc::error::SendError;
use tokio::sync::mpsc::UnboundedSender;

// Type alias for user IDs (the session layer hands these over as opaque strings)
pub type UserId = String;

/// Sending half of a stream's frame channel.
pub type FrameSender = UnboundedSender<Frame>;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Writable, ordered destination for the frames of one open stream.
///
/// Cloning a sink clones the channel handle; both clones write to the same stream.
#[derive(Debug, Clone)]
pub struct Sink {
    connection_id: ConnectionId,
    sender: FrameSender,
}

impl Sink {
    pub fn new(sender: FrameSender) -> Self {
        Self {
            connection_id: ConnectionId::new(),
            sender,
        }
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    pub fn write(&self, frame: Frame) -> Result<(), SendError<Frame>> {
        self.sender.send(frame)
    }

    /// True once the receiving end of the stream has gone away.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl PartialEq for Sink {
    fn eq(&self, other: &Self) -> bool {
        self.connection_id == other.connection_id
    }
}

impl Eq for Sink {}

/// Outcome of a best-effort delivery. None of these are errors for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Exactly one frame was written to the user's stream.
    Delivered,
    /// The user has no open stream; the event is lost.
    NoRecipient,
    /// The stream is gone but its disconnect has not been observed yet.
    SinkClosed,
    /// The event could not be serialized.
    Dropped,
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

/// Concurrent registry of the one live stream per connected user.
///
/// Every method runs to completion under the shard lock of the key it
/// touches, so concurrent request handlers never observe a half-applied change.
#[derive(Debug)]
pub struct ConnectionRegistry {
    connections: DashMap<UserId, Sink>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Store `sink` for `user_id`, replacing any previous one (last writer wins).
    /// Returns the superseded sink, if there was one.
    pub fn register(&self, user_id: UserId, sink: Sink) -> Option<Sink> {
        self.connections.insert(user_id, sink)
    }

    /// Remove whatever is stored for `user_id`. Returns whether an entry existed.
    pub fn unregister(&self, user_id: &str) -> bool {
        self.connections.remove(user_id).is_some()
    }

    /// Remove the entry for `user_id` only while it still belongs to `connection_id`.
    ///
    /// A superseded stream that disconnects late must not evict its replacement.
    pub fn unregister_connection(&self, user_id: &str, connection_id: &ConnectionId) -> bool {
        self.connections
            .remove_if(user_id, |_, sink| sink.connection_id() == connection_id)
            .is_some()
    }

    pub fn lookup(&self, user_id: &str) -> Option<Sink> {
        self.connections.get(user_id).map(|sink| sink.clone())
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Write one frame to the stream registered for `user_id`.
    ///
    /// A failed write leaves the entry in place; the stream's own disconnect
    /// or the sweep removes it.
    pub fn send_to_user(&self, user_id: &str, frame: Frame) -> Delivery {
        let Some(sink) = self.connections.get(user_id) else {
            trace!("No SSE connection for user {user_id}, dropping event");
            return Delivery::NoRecipient;
        };

        match sink.write(frame) {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                warn!(
                    "Failed to send event to connection {} of user {}: {}. Connection will be cleaned up.",
                    sink.connection_id().as_str(),
                    user_id,
                    e
                );
                Delivery::SinkClosed
            }
        }
    }

    /// Write one frame to every registered stream. Returns the number of successful writes.
    pub fn broadcast(&self, frame: Frame) -> usize {
        let mut delivered = 0;
        for sink in self.connections.iter() {
            match sink.write(frame.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    "Failed to send broadcast to connection {}: {}",
                    sink.connection_id().as_str(),
                    e
                ),
            }
        }
        delivered
    }

    /// Drop entries whose stream has already gone away without deregistering.
    ///
    /// Open streams stay registered however long they have been quiet.
    /// Returns the number of entries removed.
    pub fn prune(&self) -> usize {
        let mut removed = 0;
        self.connections.retain(|user_id, sink| {
            if sink.is_closed() {
                debug!("Pruning closed SSE connection for user {user_id}");
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns one registered stream. Dropping it deregisters the stream, which is
/// how the transport's disconnect reaches the registry.
#[derive(Debug)]
pub struct ConnectionGuard {
    registry: Arc<ConnectionRegistry>,
    user_id: UserId,
    connection_id: ConnectionId,
}

impl ConnectionGuard {
    pub(crate) fn new(
        registry: Arc<ConnectionRegistry>,
        user_id: UserId,
        connection_id: ConnectionId,
    ) -> Self {
        Self {
            registry,
            user_id,
            connection_id,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self
            .registry
            .unregister_connection(&self.user_id, &self.connection_id)
        {
            info!(
                "Unregistered SSE connection {} for user {}",
                self.connection_id.as_str(),
                self.user_id
            );
        } else {
            debug!(
                "SSE connection {} for user {} was already replaced or removed",
                self.connection_id.as_str(),
                self.user_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Event;
    use tokio::sync::mpsc;

    fn sink() -> (Sink, mpsc::UnboundedReceiver<Frame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Sink::new(tx), rx)
    }

    fn frame(event_type: &str) -> Frame {
        Frame::from_event(&Event::new(event_type)).unwrap()
    }

    #[test]
    fn lookup_follows_register_replace_and_unregister() {
        let registry = ConnectionRegistry::new();
        let (first, _rx1) = sink();
        let (second, _rx2) = sink();

        assert!(registry.lookup("u1").is_none());

        assert!(registry.register("u1".to_string(), first.clone()).is_none());
        assert_eq!(registry.lookup("u1"), Some(first.clone()));

        let superseded = registry.register("u1".to_string(), second.clone());
        assert_eq!(superseded, Some(first));
        assert_eq!(registry.lookup("u1"), Some(second));
        assert_eq!(registry.len(), 1);

        assert!(registry.unregister("u1"));
        assert!(registry.lookup("u1").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn unregister_absent_user_leaves_others_untouched() {
        let registry = ConnectionRegistry::new();
        let (s, _rx) = sink();
        registry.register("u1".to_string(), s.clone());

        assert!(!registry.unregister("nobody"));
        assert_eq!(registry.lookup("u1"), Some(s));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn superseded_connection_cannot_evict_its_replacement() {
        let registry = ConnectionRegistry::new();
        let (old, _rx1) = sink();
        let (new, _rx2) = sink();
        registry.register("u1".to_string(), old.clone());
        registry.register("u1".to_string(), new.clone());

        assert!(!registry.unregister_connection("u1", old.connection_id()));
        assert_eq!(registry.lookup("u1"), Some(new.clone()));

        assert!(registry.unregister_connection("u1", new.connection_id()));
        assert!(!registry.contains("u1"));
    }

    #[test]
    fn send_to_user_writes_exactly_one_frame() {
        let registry = ConnectionRegistry::new();
        let (s, mut rx) = sink();
        registry.register("u1".to_string(), s);

        assert_eq!(registry.send_to_user("u1", frame("like")), Delivery::Delivered);
        assert_eq!(rx.try_recv().unwrap(), frame("like"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_to_unknown_user_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        assert_eq!(
            registry.send_to_user("u2", frame("like")),
            Delivery::NoRecipient
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn send_to_closed_sink_keeps_entry_for_later_cleanup() {
        let registry = ConnectionRegistry::new();
        let (s, rx) = sink();
        registry.register("u1".to_string(), s);
        drop(rx);

        assert_eq!(registry.send_to_user("u1", frame("like")), Delivery::SinkClosed);
        assert!(registry.contains("u1"));
    }

    #[test]
    fn broadcast_counts_successful_writes() {
        let registry = ConnectionRegistry::new();
        let (a, mut rx_a) = sink();
        let (b, rx_b) = sink();
        registry.register("a".to_string(), a);
        registry.register("b".to_string(), b);
        drop(rx_b);

        assert_eq!(registry.broadcast(frame("announcement")), 1);
        assert_eq!(rx_a.try_recv().unwrap(), frame("announcement"));
    }

    #[test]
    fn prune_removes_closed_sinks() {
        let registry = ConnectionRegistry::new();
        let (open, _rx_open) = sink();
        let (closed, rx_closed) = sink();
        registry.register("open".to_string(), open);
        registry.register("closed".to_string(), closed);
        drop(rx_closed);

        assert_eq!(registry.prune(), 1);
        assert!(registry.contains("open"));
        assert!(!registry.contains("closed"));
    }

    #[test]
    fn prune_keeps_quiet_open_streams() {
        let registry = ConnectionRegistry::new();
        let (s, mut rx) = sink();
        registry.register("u1".to_string(), s.clone());

        // Nothing was ever delivered, but the receiver is still held.
        assert_eq!(registry.prune(), 0);
        assert_eq!(registry.lookup("u1"), Some(s));
        assert!(matches!(
            rx.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn dropping_guard_unregisters_only_its_own_connection() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (old, _rx1) = sink();
        let (new, _rx2) = sink();

        registry.register("u1".to_string(), old.clone());
        let old_guard = ConnectionGuard::new(
            registry.clone(),
            "u1".to_string(),
            old.connection_id().clone(),
        );
        registry.register("u1".to_string(), new.clone());
        let new_guard = ConnectionGuard::new(
            registry.clone(),
            "u1".to_string(),
            new.connection_id().clone(),
        );

        drop(old_guard);
        assert_eq!(registry.lookup("u1"), Some(new));

        drop(new_guard);
        assert!(registry.is_empty());
    }
}
